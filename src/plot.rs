use std::fmt::Display;

/// Horizontal bar chart for the terminal, one bar per format.
pub struct BarChart {
    pub ylabel: String,
    pub bars: Vec<(String, f64)>,
    pub width: usize,
}

impl BarChart {
    pub fn new(ylabel: &str, width: usize) -> Self {
        BarChart {
            ylabel: String::from(ylabel),
            bars: vec![],
            width: width.max(1),
        }
    }

    pub fn bar(mut self, label: &str, value: f64) -> Self {
        self.bars.push((String::from(label), value));
        self
    }

    fn bar_length(&self, value: f64, max: f64) -> usize {
        if max <= 0.0 || !value.is_finite() || value <= 0.0 {
            return 0;
        }
        let len = ((value / max) * self.width as f64).round() as usize;
        // anything measurable gets at least one cell
        len.clamp(1, self.width)
    }
}

impl Display for BarChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.ylabel)?;
        let max = self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let label_width = self.bars.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        for (label, value) in &self.bars {
            let bar = "█".repeat(self.bar_length(*value, max));
            writeln!(f, "{:>label_width$} │{:<width$} {:.2}", label, bar, value, width = self.width)?;
        }
        Ok(())
    }
}
