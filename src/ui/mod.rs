//! Terminal output: spinners and status lines

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str, enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(message.to_string());

        Self { bar }
    }

    /// Status line printed above the spinner
    pub fn pass(&self, message: &str) {
        self.println(format!("  {} {}", "✔".green(), message));
    }

    pub fn miss(&self, message: &str) {
        self.println(format!("  {} {}", "✖".red(), message));
    }

    fn println(&self, line: String) {
        // Hidden bars swallow println
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    pub fn succeed(self, message: &str) {
        self.finish(format!("{} {}", "✔".green(), message));
    }

    pub fn fail(self, message: &str) {
        self.finish(format!("{} {}", "✖".red(), message));
    }

    fn finish(self, line: String) {
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            if let Ok(style) = ProgressStyle::with_template("{msg}") {
                self.bar.set_style(style);
            }
            self.bar.finish_with_message(line);
        }
    }
}

pub fn banner(project: &str, details: &str) {
    if details.is_empty() {
        println!("\n{} {}\n", "envcheck".bold(), project.cyan());
    } else {
        println!("\n{} {} {}\n", "envcheck".bold(), project.cyan(), details.dimmed());
    }
}

pub fn log(message: &str) {
    println!("{}", message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}
