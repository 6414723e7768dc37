//! Styled terminal output for appconv
//!
//! Everything goes to stdout; failures are reported by `main` on stderr.

use owo_colors::OwoColorize;

// Palette
const MINT: (u8, u8, u8) = (152, 225, 152);
const CREAM: (u8, u8, u8) = (255, 230, 160);
const SKY: (u8, u8, u8) = (160, 200, 255);
const LAVENDER: (u8, u8, u8) = (181, 174, 254);
const GREY: (u8, u8, u8) = (160, 160, 160);

/// Print a success message with a green checkmark
pub fn success(message: &str) {
    println!(
        "{} {}",
        "✓".truecolor(MINT.0, MINT.1, MINT.2).bold(),
        message.bright_white()
    );
}

/// Print a warning message with a yellow warning symbol
pub fn warning(message: &str) {
    println!(
        "{} {}",
        "⚠".truecolor(CREAM.0, CREAM.1, CREAM.2).bold(),
        message.bright_white()
    );
}

/// Print an info message with a blue info symbol
pub fn info(message: &str) {
    println!(
        "{} {}",
        "ℹ".truecolor(SKY.0, SKY.1, SKY.2).bold(),
        message.bright_white()
    );
}

/// Print a section header with a separator line
pub fn section(title: &str) {
    println!(
        "\n{}",
        title.truecolor(LAVENDER.0, LAVENDER.1, LAVENDER.2).bold()
    );
    println!("{}", "─".repeat(50).truecolor(GREY.0, GREY.1, GREY.2));
}

/// Print a key-value pair with styled key and value
pub fn key_value(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).truecolor(GREY.0, GREY.1, GREY.2),
        value.bright_white()
    );
}

pub fn dimmed(message: &str) {
    println!("{}", message.truecolor(GREY.0, GREY.1, GREY.2));
}
