//! CLI `day` and `list` commands — print a day's entries in the terminal.

use anyhow::Result;
use chrono::Local;

use super::{mark, open};
use crate::config::DiaryConfig;
use crate::diary::{self, DiaryEntry};

/// Print the 24-slot view of a day (today when `date` is `None`).
pub fn day(config: &DiaryConfig, date: Option<&str>) -> Result<()> {
    let date = diary::resolve_date(date, &Local)?;
    let conn = open(config)?;
    let slots = diary::full_day(&conn, date, &Local)?;

    println!("Diary for {date}");
    println!("{}", "=".repeat(40));
    print_header();
    for slot in &slots {
        print_row(slot);
    }
    println!();
    print_totals(&slots);

    Ok(())
}

/// Print only the recorded entries of a day.
pub fn list(config: &DiaryConfig, date: Option<&str>) -> Result<()> {
    let date = diary::resolve_date(date, &Local)?;
    let conn = open(config)?;
    let entries = diary::entries_for_date(&conn, date, &Local)?;

    if entries.is_empty() {
        println!("No entries recorded on {date}.");
        return Ok(());
    }

    println!("Entries on {date}");
    println!("{}", "=".repeat(40));
    print_header();
    for entry in &entries {
        print_row(entry);
    }

    Ok(())
}

fn print_header() {
    println!("  {:<8} {:>6} {:>6} {:>6}", "Time", "Milk", "Urine", "Poop");
}

fn print_row(entry: &DiaryEntry) {
    println!(
        "  {:<8} {:>6} {:>6} {:>6}",
        entry.time.format("%H:%M"),
        entry.milk,
        mark(entry.urine),
        mark(entry.poop),
    );
}

fn print_totals(slots: &[DiaryEntry]) {
    let milk: i64 = slots.iter().map(|s| s.milk).sum();
    let urine: i64 = slots.iter().map(|s| s.urine).sum();
    let poop: i64 = slots.iter().map(|s| s.poop).sum();
    println!("Total milk:            {milk}");
    println!("Urine (hours):         {urine}");
    println!("Poop (hours):          {poop}");
}
