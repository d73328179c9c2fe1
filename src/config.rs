use alloc::string::String;

use crate::errors::{GroupDecayError, Result};
use crate::layout::ParamKind;
use crate::policy::DecayPolicy;

/// Training settings handed to the optimizer
///
/// Every setter validates its value, so a constructed configuration is always usable.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    data: String,
    epochs: u64,
    imgsz: usize,
    batch: usize,
    weight_decay: f64,
    bias_decay: f64,
    verbose: bool,
}

impl TrainConfig {
    /// Creates a new configuration for the given dataset.
    ///
    /// Defaults: epochs=100, imgsz=640, batch=16, weight_decay=0.0005, bias_decay=0.0,
    /// verbose=true
    pub fn new<S>(data: S) -> Result<Self>
    where
        S: Into<String>,
    {
        let data = data.into();
        if data.is_empty() {
            return Err(GroupDecayError::invalid_argument("data must not be empty"));
        }
        Ok(Self {
            data,
            epochs: 100,
            imgsz: 640,
            batch: 16,
            weight_decay: 0.0005,
            bias_decay: 0.0,
            verbose: true,
        })
    }

    /// Creates a new configuration and applies `key=value` overrides in order.
    pub fn from_overrides<S, I, T>(data: S, overrides: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut config = Self::new(data)?;
        for item in overrides {
            config = config.apply_override(item.as_ref())?;
        }
        Ok(config)
    }

    /// Applies a single `key=value` override such as `bias_decay=0.0001`.
    ///
    /// Recognized keys are `data`, `epochs`, `imgsz`, `batch`, `weight_decay`, `bias_decay`
    /// and `verbose`.
    pub fn apply_override(self, item: &str) -> Result<Self> {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| GroupDecayError::invalid_argument("override must be key=value"))?;
        let value = value.trim();
        match key.trim() {
            "data" => {
                if value.is_empty() {
                    return Err(GroupDecayError::invalid_argument("data must not be empty"));
                }
                Ok(Self {
                    data: value.into(),
                    ..self
                })
            }
            "epochs" => self.epochs(parse(value, "epochs must be an integer")?),
            "imgsz" => self.imgsz(parse(value, "imgsz must be an integer")?),
            "batch" => self.batch(parse(value, "batch must be an integer")?),
            "weight_decay" => self.weight_decay(parse(value, "weight_decay must be a number")?),
            "bias_decay" => self.bias_decay(parse(value, "bias_decay must be a number")?),
            "verbose" => Ok(self.verbose(parse_bool(value)?)),
            _ => Err(GroupDecayError::invalid_argument("unknown override key")),
        }
    }

    /// Sets the number of epochs
    pub fn epochs(mut self, epochs: u64) -> Result<Self> {
        if epochs == 0 {
            return Err(GroupDecayError::invalid_argument("epochs must not be 0"));
        }
        self.epochs = epochs;
        Ok(self)
    }

    /// Sets the input image size
    pub fn imgsz(mut self, imgsz: usize) -> Result<Self> {
        if imgsz == 0 {
            return Err(GroupDecayError::invalid_argument("imgsz must not be 0"));
        }
        self.imgsz = imgsz;
        Ok(self)
    }

    /// Sets the batch size
    pub fn batch(mut self, batch: usize) -> Result<Self> {
        if batch == 0 {
            return Err(GroupDecayError::invalid_argument("batch must not be 0"));
        }
        self.batch = batch;
        Ok(self)
    }

    /// Sets the decay coefficient of weights
    pub fn weight_decay(mut self, weight_decay: f64) -> Result<Self> {
        if !weight_decay.is_finite() || weight_decay < 0.0 {
            return Err(GroupDecayError::invalid_argument(
                "weight_decay must be finite and greater than or equal to 0.0",
            ));
        }
        self.weight_decay = weight_decay;
        Ok(self)
    }

    /// Sets the decay coefficient of biases
    pub fn bias_decay(mut self, bias_decay: f64) -> Result<Self> {
        if !bias_decay.is_finite() || bias_decay < 0.0 {
            return Err(GroupDecayError::invalid_argument(
                "bias_decay must be finite and greater than or equal to 0.0",
            ));
        }
        self.bias_decay = bias_decay;
        Ok(self)
    }

    /// Enables or disables progress output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Gets the dataset name
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Gets the number of epochs
    pub const fn get_epochs(&self) -> u64 {
        self.epochs
    }

    /// Gets the input image size
    pub const fn get_imgsz(&self) -> usize {
        self.imgsz
    }

    /// Gets the batch size
    pub const fn get_batch(&self) -> usize {
        self.batch
    }

    /// Gets the decay coefficient of weights
    pub const fn get_weight_decay(&self) -> f64 {
        self.weight_decay
    }

    /// Gets the decay coefficient of biases
    pub const fn get_bias_decay(&self) -> f64 {
        self.bias_decay
    }

    /// Checks if progress output is enabled
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Builds the decay policy for this run.
    ///
    /// Normalization scales and other kinds have no entry and are not decayed.
    pub fn decay_policy(&self) -> Result<DecayPolicy> {
        Ok(DecayPolicy::builder()
            .decay(ParamKind::Weight, self.weight_decay)?
            .decay(ParamKind::Bias, self.bias_decay)?
            .build())
    }
}

fn parse<T>(value: &str, msg: &'static str) -> Result<T>
where
    T: core::str::FromStr,
{
    value
        .parse()
        .map_err(|_| GroupDecayError::invalid_argument(msg))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(GroupDecayError::invalid_argument("verbose must be a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainConfig::new("imagenet10").unwrap();
        assert_eq!("imagenet10", config.data());
        assert_eq!(100, config.get_epochs());
        assert_eq!(640, config.get_imgsz());
        assert_eq!(16, config.get_batch());
        assert_eq!(0.0005, config.get_weight_decay());
        assert_eq!(0.0, config.get_bias_decay());
        assert!(config.is_verbose());
    }

    #[test]
    fn test_builder() {
        let config = TrainConfig::new("imagenet10")
            .unwrap()
            .epochs(1)
            .unwrap()
            .imgsz(32)
            .unwrap()
            .batch(8)
            .unwrap()
            .weight_decay(0.0005)
            .unwrap()
            .bias_decay(0.0001)
            .unwrap()
            .verbose(false);
        assert_eq!(1, config.get_epochs());
        assert_eq!(32, config.get_imgsz());
        assert_eq!(8, config.get_batch());
        assert_eq!(0.0001, config.get_bias_decay());
        assert!(!config.is_verbose());
    }

    #[test]
    fn test_reject_invalid_values() {
        assert!(TrainConfig::new("").is_err());
        let config = TrainConfig::new("imagenet10").unwrap();
        assert!(config.clone().epochs(0).is_err());
        assert!(config.clone().imgsz(0).is_err());
        assert!(config.clone().batch(0).is_err());
        assert!(config.clone().weight_decay(-0.1).is_err());
        assert!(config.clone().bias_decay(f64::NAN).is_err());
        assert!(config.bias_decay(f64::INFINITY).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = TrainConfig::from_overrides(
            "imagenet10",
            [
                "epochs=1",
                "imgsz=32",
                "batch=8",
                "weight_decay=0.0005",
                "bias_decay=0.0001",
                "verbose=True",
            ],
        )
        .unwrap();
        let expected = TrainConfig::new("imagenet10")
            .unwrap()
            .epochs(1)
            .unwrap()
            .imgsz(32)
            .unwrap()
            .batch(8)
            .unwrap()
            .bias_decay(0.0001)
            .unwrap();
        assert_eq!(expected, config);

        let config = config.apply_override(" data = coco8 ").unwrap();
        assert_eq!("coco8", config.data());
    }

    #[test]
    fn test_reject_invalid_overrides() {
        let config = TrainConfig::new("imagenet10").unwrap();
        assert!(config.clone().apply_override("bias_decay").is_err());
        assert!(config.clone().apply_override("momentum=0.9").is_err());
        assert!(config.clone().apply_override("epochs=one").is_err());
        assert!(config.clone().apply_override("epochs=0").is_err());
        assert!(config.clone().apply_override("bias_decay=-1").is_err());
        assert!(config.clone().apply_override("verbose=maybe").is_err());
        assert!(config.apply_override("data=").is_err());
    }

    #[test]
    fn test_decay_policy() {
        let policy = TrainConfig::new("imagenet10")
            .unwrap()
            .bias_decay(0.0001)
            .unwrap()
            .decay_policy()
            .unwrap();
        assert_eq!(0.0005, policy.get(&ParamKind::Weight));
        assert_eq!(0.0001, policy.get(&ParamKind::Bias));
        assert_eq!(0.0, policy.get(&ParamKind::NormScale));
    }
}
