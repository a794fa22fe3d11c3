//! User-facing console output.
//! Consistent, colored prefixes for CLI messages; colors only when stdout is a TTY.

use owo_colors::OwoColorize;

/// True when stdout is attached to a terminal.
pub fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Section heading for listings, e.g. `Folders:`.
pub fn print_heading(title: &str) {
    if is_tty() {
        println!("{}", format!("{title}:").bold());
    } else {
        println!("{title}:");
    }
}

/// Indented `key  value` line under a heading.
pub fn print_entry(key: &str, value: &str) {
    if is_tty() {
        println!("  {}  {}", key.cyan(), value);
    } else {
        println!("  {key}  {value}");
    }
}

/// Print a plain user-facing line (no prefix) that scripts may consume.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
