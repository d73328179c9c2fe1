//! Runs one epoch with a bias decay and prints the optimizer setup for visual inspection.

use groupdecay::{Objective, ParameterLayout, TrainConfig, Trainer};

/// Pulls every weight towards a fixed "pretrained" value.
struct Pretrained {
    weights: Vec<f64>,
}

impl Objective for Pretrained {
    fn loss(&self, params: &[f64]) -> f64 {
        let mut loss = 0.0;
        for (w, p) in params.iter().zip(&self.weights) {
            loss += (w - p) * (w - p);
        }
        loss * 0.5
    }

    fn gradient(&self, params: &[f64]) -> Vec<f64> {
        params
            .iter()
            .zip(&self.weights)
            .map(|(w, p)| w - p)
            .collect()
    }
}

fn classifier_layout() -> groupdecay::errors::Result<ParameterLayout> {
    let mut layout = ParameterLayout::new();
    for (i, channels) in [16, 32, 64].into_iter().enumerate() {
        layout.add_inferred(format!("model.{i}.conv.weight"), channels * 9)?;
        layout.add_inferred(format!("model.{i}.bn.weight"), channels)?;
        layout.add_inferred(format!("model.{i}.bn.bias"), channels)?;
    }
    layout.add_inferred("model.3.linear.weight", 64 * 10)?;
    layout.add_inferred("model.3.linear.bias", 10)?;
    Ok(layout)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rule = "=".repeat(80);
    println!("{rule}");
    println!("Testing bias_decay parameter");
    println!("{rule}");

    let layout = classifier_layout()?;
    let pretrained = Pretrained {
        weights: (0..layout.n_weights())
            .map(|i| ((i % 17) as f64 - 8.0) / 8.0)
            .collect(),
    };

    println!("\nTraining with bias_decay=0.0001...");
    let config = TrainConfig::from_overrides(
        "imagenet10",
        [
            "epochs=1",
            "imgsz=32",
            "batch=8",
            "weight_decay=0.0005",
            "bias_decay=0.0001",
            "verbose=true",
        ],
    )?;
    // dropping the trainer flushes its logger before the closing banner
    {
        let trainer = Trainer::new(config);
        let init = vec![0.0; layout.n_weights()];
        trainer.train(&layout, &pretrained, init)?;
    }

    println!("\n{rule}");
    println!("Test completed! Check the optimizer initialization message above.");
    println!("It should show: bias(decay=0.0001)");
    println!("{rule}");
    Ok(())
}
