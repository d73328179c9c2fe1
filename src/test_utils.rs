use crate::layout::ParameterLayout;

/// Two conv/bn blocks followed by a classification head.
pub fn generate_test_layout() -> ParameterLayout {
    let mut layout = ParameterLayout::new();
    layout.add_inferred("model.0.conv.weight", 27).unwrap();
    layout.add_inferred("model.0.bn.weight", 3).unwrap();
    layout.add_inferred("model.0.bn.bias", 3).unwrap();
    layout.add_inferred("model.1.conv.weight", 18).unwrap();
    layout.add_inferred("model.1.conv.bias", 2).unwrap();
    layout.add_inferred("model.1.bn.weight", 2).unwrap();
    layout.add_inferred("model.1.bn.bias", 2).unwrap();
    layout.add_inferred("head.linear.weight", 20).unwrap();
    layout.add_inferred("head.norm.weight", 10).unwrap();
    layout.add_inferred("head.linear.bias", 10).unwrap();
    layout
}

/// Loss `0.5 * ||w - t||^2` pulling every weight towards a fixed target.
#[cfg(feature = "train")]
pub struct Quadratic {
    pub target: alloc::vec::Vec<f64>,
}

#[cfg(feature = "train")]
impl crate::penalty::Objective for Quadratic {
    fn loss(&self, params: &[f64]) -> f64 {
        params
            .iter()
            .zip(&self.target)
            .map(|(w, t)| (w - t) * (w - t))
            .sum::<f64>()
            * 0.5
    }

    fn gradient(&self, params: &[f64]) -> alloc::vec::Vec<f64> {
        params.iter().zip(&self.target).map(|(w, t)| w - t).collect()
    }
}
