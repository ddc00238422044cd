use std::time::Duration;

use crate::models::AttributeSelection;

/// Fixed facts about the running dashboard, shown around the histogram.
#[derive(Debug, Clone)]
pub struct App {
    pub source: String,
    pub attribute: AttributeSelection,
    pub interval: Duration,
    pub bins: usize,
}

impl App {
    pub fn new(
        source: String,
        attribute: AttributeSelection,
        interval: Duration,
        bins: usize,
    ) -> Self {
        Self {
            source,
            attribute,
            interval,
            bins,
        }
    }

    pub fn interval_label(&self) -> String {
        let secs = self.interval.as_secs_f64();
        if secs.fract() == 0.0 {
            format!("{}s", secs as u64)
        } else {
            format!("{:.1}s", secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_label() {
        let mut app = App::new(
            "plots.csv".to_string(),
            AttributeSelection::new("height"),
            Duration::from_secs(15),
            10,
        );
        assert_eq!(app.interval_label(), "15s");

        app.interval = Duration::from_millis(500);
        assert_eq!(app.interval_label(), "0.5s");
    }
}
