use indicatif::{ProgressBar, ProgressStyle};

/// Single-line progress indicator, overwritten in place on stderr
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// A bar over `len` files; draws nothing when `visible` is false
    pub fn new(len: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(len)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("[{pos}/{len}] {wide_msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }

    /// Show the file now being processed
    pub fn start_file(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    /// Count one file as done
    pub fn file_done(&self) {
        self.bar.inc(1);
    }

    /// Print a line above the bar
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Files counted so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = Progress::new(3, false);
        progress.start_file("a.png");
        progress.file_done();
        progress.file_done();
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}
