// ModelSummary: parameter table for a block, before or after resolution
//
// Unresolved parameters are listed with their partial shape, e.g. (128, ?),
// and contribute nothing to the totals until the first forward pass.

use std::fmt;

use strata_nn::Module;

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRow {
    pub name: String,
    /// Declared shape as printed, `?` for unknown dims.
    pub shape: String,
    /// Element count, `None` while unresolved.
    pub numel: Option<usize>,
}

/// Parameter statistics for a block.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    /// Total number of allocated scalar parameters.
    pub total_params: usize,
    /// Number of parameter tensors, resolved or not.
    pub num_tensors: usize,
    /// Number of parameter tensors still waiting for a shape.
    pub unresolved: usize,
    pub rows: Vec<ParamRow>,
    /// Estimated memory in bytes (f32 storage).
    pub estimated_bytes: usize,
}

impl ModelSummary {
    /// Compute a summary for the given block.
    pub fn from_module(module: &dyn Module) -> Self {
        let params = module.collect_parameters();
        let rows: Vec<ParamRow> = params
            .iter()
            .map(|(name, p)| ParamRow {
                name: name.to_string(),
                shape: p.shape().to_string(),
                numel: p.num_elements(),
            })
            .collect();

        let total_params = rows.iter().filter_map(|r| r.numel).sum();
        let unresolved = rows.iter().filter(|r| r.numel.is_none()).count();

        ModelSummary {
            total_params,
            num_tensors: rows.len(),
            unresolved,
            rows,
            estimated_bytes: total_params * std::mem::size_of::<f32>(),
        }
    }
}

// Inner width of the box, between the two vertical borders.
const WIDTH: usize = 76;
const NAME_COL: usize = 44;

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "─".repeat(WIDTH);
        let text = WIDTH - 2;
        writeln!(f, "┌{rule}┐")?;
        writeln!(f, "│ {:<text$} │", "Model Summary")?;
        writeln!(f, "├{rule}┤")?;
        for row in &self.rows {
            let numel = match row.numel {
                Some(n) => n.to_string(),
                None => "deferred".to_string(),
            };
            writeln!(
                f,
                "│ {:<NAME_COL$} {:>16} {:>12} │",
                truncate_str(&row.name, NAME_COL),
                truncate_str(&row.shape, 16),
                numel
            )?;
        }
        writeln!(f, "├{rule}┤")?;
        let totals = format!(
            "Total params: {}  Tensors: {}  Deferred: {}  Mem: {}",
            format_params(self.total_params),
            self.num_tensors,
            self.unresolved,
            format_bytes(self.estimated_bytes),
        );
        writeln!(f, "│ {:<text$} │", truncate_str(&totals, text))?;
        write!(f, "└{rule}┘")
    }
}

fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

fn format_params(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1e3)
    } else {
        format!("{n}")
    }
}

/// Human-readable byte count.
pub fn format_bytes(bytes: usize) -> String {
    if bytes >= 1 << 20 {
        format!("{:.1}MB", bytes as f64 / (1u64 << 20) as f64)
    } else if bytes >= 1 << 10 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use ndarray::Array2;
    use strata_core::{Context, Ones};
    use strata_nn::{Dense, NameScope, Sequential};

    #[test]
    fn test_summary_before_and_after_forward() {
        let mut names = NameScope::root();
        let mut net = Sequential::new(&mut names)
            .with(Dense::new(3))
            .with(Dense::new(2));

        let before = ModelSummary::from_module(&net);
        assert_eq!(before.num_tensors, 4);
        assert_eq!(before.unresolved, 4);
        assert_eq!(before.total_params, 0);
        assert_eq!(before.rows[0].shape, "(3, ?)");

        net.initialize(Rc::new(Ones), &Context::cpu()).unwrap();
        net.forward(&Array2::zeros((1, 4))).unwrap();
        let after = ModelSummary::from_module(&net);
        assert_eq!(after.unresolved, 0);
        assert_eq!(after.total_params, 3 * 4 + 3 + 2 * 3 + 2);
        assert_eq!(after.estimated_bytes, after.total_params * 4);
        assert!(after.to_string().contains("sequential0_dense1_weight"));
    }

    #[test]
    fn test_box_lines_align_with_nested_names() {
        let mut names = NameScope::root();
        let inner = Sequential::new(&mut names).with(Dense::new(4));
        let mut outer = Sequential::new(&mut names).with(inner).with(Dense::new(2));
        outer.initialize(Rc::new(Ones), &Context::cpu()).unwrap();
        outer.forward(&Array2::zeros((1, 1000))).unwrap();

        let printed = ModelSummary::from_module(&outer).to_string();
        assert!(printed.contains("sequential1_sequential0_dense0_weight"));
        let widths: Vec<usize> = printed.lines().map(|l| l.chars().count()).collect();
        assert!(
            widths.iter().all(|&w| w == WIDTH + 2),
            "{widths:?}\n{printed}"
        );
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_params(999), "999");
        assert_eq!(format_params(109_386), "109.39K");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.0KB");
        assert_eq!(truncate_str("abcdef", 4), "abc…");
    }
}
