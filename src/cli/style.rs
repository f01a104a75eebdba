//! Terminal styling helpers shared by the commands and the form

use colored::*;
use std::io::Write;

pub(crate) const W: usize = 58; // box inner width

pub(crate) fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
pub(crate) fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
pub(crate) fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
pub(crate) fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
pub(crate) fn bad(s: &str) -> ColoredString    { s.truecolor(240, 110, 110) }

pub(crate) fn line_box_top()    { println!("  {}", dim(&format!("┌{}┐", "─".repeat(W + 1)))); }
pub(crate) fn line_box_bottom() { println!("  {}", dim(&format!("└{}┘", "─".repeat(W + 1)))); }
pub(crate) fn line_box_sep()    { println!("  {}", dim(&format!("├{}┤", "─".repeat(W + 1)))); }

pub(crate) fn line_box(content: &str) {
    let visible_len = visible_width(content);
    let pad = W.saturating_sub(visible_len + 1);
    println!("  {} {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

pub(crate) fn line_box_center(content: &str) {
    let visible_len = visible_width(content);
    let total_pad = W.saturating_sub(visible_len + 1);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {} {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

pub(crate) fn line_box_empty() { line_box(""); }

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

/// Printed width in terminal cells (box-drawing glyphs count as one)
pub(crate) fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

pub(crate) fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

pub(crate) fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

pub(crate) fn step_warn(msg: &str) {
    println!("  {} {}", bad("!"), msg);
}

pub(crate) fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

pub(crate) fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

pub(crate) fn step_failed() {
    println!("{}", bad("failed"));
}

pub(crate) fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

pub(crate) fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}
