use core::fmt;
use core::ops::Range;

use alloc::string::String;
use alloc::vec::Vec;

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

use crate::errors::{GroupDecayError, Result};

/// Handle of a trainable parameter tensor
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Decode, Encode)]
pub struct ParamId(usize);

impl ParamId {
    /// Creates a new handle from a raw index
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Gets the raw index
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a user-defined parameter kind
///
/// Built-in names (`weight`, `bias`, `norm-scale`) never appear here, so each group name
/// maps to exactly one [`ParamKind`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CustomKind(String);

impl CustomKind {
    /// Gets the name
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Kind of a parameter, which also names the group it falls into
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ParamKind {
    /// Weights of convolutions and linear layers.
    Weight,

    /// Biases of any layer.
    Bias,

    /// Scales of normalization layers.
    NormScale,

    /// Any other user-defined kind. Created by [`ParamKind::custom()`].
    Other(CustomKind),
}

impl ParamKind {
    /// Creates a kind from its group name.
    ///
    /// Built-in names resolve to their own variants, so `custom("bias")` is [`ParamKind::Bias`].
    pub fn custom<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        let name = name.into();
        match name.as_str() {
            "weight" => Self::Weight,
            "bias" => Self::Bias,
            "norm-scale" => Self::NormScale,
            _ => Self::Other(CustomKind(name)),
        }
    }

    /// Gets the group name of this kind
    pub fn name(&self) -> &str {
        match self {
            Self::Weight => "weight",
            Self::Bias => "bias",
            Self::NormScale => "norm-scale",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Infers the kind from a dotted parameter path such as `model.3.bn.weight`.
    ///
    /// A trailing `bias` segment is a bias. A trailing `weight`, `scale` or `gamma` segment
    /// whose module is a normalization layer is a normalization scale. The module counts as
    /// one if its name contains `norm`, or if it is `bn`, `ln` or `gn` with an optional
    /// numeric suffix (`bn1`, `ln_2`). Everything else is a weight.
    pub fn infer(path: &str) -> Self {
        let mut segments = path.rsplit('.');
        let leaf = segments.next().unwrap_or_default();
        if leaf == "bias" {
            return Self::Bias;
        }
        let module = segments.next().unwrap_or_default().to_ascii_lowercase();
        let stem = module.trim_end_matches(|c: char| c.is_ascii_digit() || c == '_');
        let is_norm = matches!(stem, "bn" | "ln" | "gn") || module.contains("norm");
        if is_norm && matches!(leaf, "weight" | "scale" | "gamma") {
            Self::NormScale
        } else {
            Self::Weight
        }
    }
}

impl From<&str> for ParamKind {
    fn from(name: &str) -> Self {
        Self::custom(name)
    }
}

impl<Context> Decode<Context> for ParamKind {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let name: String = Decode::decode(decoder)?;
        Ok(Self::custom(name))
    }
}

bincode::impl_borrow_decode!(ParamKind);

impl Encode for ParamKind {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(self.name(), encoder)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a named parameter tensor
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct ParamSpec {
    /// Parameter path
    pub name: String,

    /// Parameter kind
    pub kind: ParamKind,

    /// Number of scalar weights
    pub len: usize,
}

/// Ordered list of parameter tensors flattened into a single weight vector
#[derive(Clone, Debug, Default)]
pub struct ParameterLayout {
    specs: Vec<ParamSpec>,
    offsets: Vec<usize>,
    ids: HashMap<String, ParamId>,
}

impl ParameterLayout {
    /// Creates a new empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter tensor and returns its handle.
    ///
    /// # Errors
    ///
    /// `len` must not be 0, and `name` must be non-empty and not already used.
    pub fn add<S>(&mut self, name: S, kind: ParamKind, len: usize) -> Result<ParamId>
    where
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(GroupDecayError::invalid_argument(
                "parameter name must not be empty",
            ));
        }
        if len == 0 {
            return Err(GroupDecayError::invalid_argument(
                "parameter length must not be 0",
            ));
        }
        if self.ids.contains_key(&name) {
            return Err(GroupDecayError::invalid_argument(
                "parameter name is already used",
            ));
        }
        let id = ParamId::new(self.specs.len());
        self.offsets.push(self.n_weights());
        self.ids.insert(name.clone(), id);
        self.specs.push(ParamSpec { name, kind, len });
        Ok(id)
    }

    /// Adds a parameter tensor whose kind is inferred from its path.
    pub fn add_inferred<S>(&mut self, name: S, len: usize) -> Result<ParamId>
    where
        S: Into<String>,
    {
        let name = name.into();
        let kind = ParamKind::infer(&name);
        self.add(name, kind, len)
    }

    /// Gets the number of parameter tensors
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Checks if the layout has no parameters
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Gets the total number of scalar weights
    pub fn n_weights(&self) -> usize {
        self.specs
            .last()
            .zip(self.offsets.last())
            .map_or(0, |(spec, offset)| offset + spec.len)
    }

    /// Gets all parameter tensors in insertion order
    #[inline(always)]
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    /// Gets the parameter tensor of the given handle
    #[inline(always)]
    pub fn get(&self, id: ParamId) -> Option<&ParamSpec> {
        self.specs.get(id.index())
    }

    /// Looks up a handle by parameter path
    #[inline(always)]
    pub fn id_of(&self, name: &str) -> Option<ParamId> {
        self.ids.get(name).copied()
    }

    /// Gets the position of the given parameter in the flat weight vector
    pub fn range(&self, id: ParamId) -> Option<Range<usize>> {
        let spec = self.specs.get(id.index())?;
        let start = self.offsets[id.index()];
        Some(start..start + spec.len)
    }

    /// Iterates over (handle, kind) pairs in insertion order
    pub fn params(&self) -> impl Iterator<Item = (ParamId, ParamKind)> + '_ {
        self.specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (ParamId::new(i), spec.kind.clone()))
    }
}

impl<Context> Decode<Context> for ParameterLayout {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let specs: Vec<ParamSpec> = Decode::decode(decoder)?;
        let mut layout = Self::new();
        for spec in specs {
            layout
                .add(spec.name, spec.kind, spec.len)
                .map_err(|_| DecodeError::Other("invalid parameter layout"))?;
        }
        Ok(layout)
    }
}

bincode::impl_borrow_decode!(ParameterLayout);

impl Encode for ParameterLayout {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.specs, encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_kind() {
        assert_eq!(ParamKind::Bias, ParamKind::infer("model.0.conv.bias"));
        assert_eq!(ParamKind::Bias, ParamKind::infer("model.0.bn.bias"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("model.0.conv.weight"));
        assert_eq!(ParamKind::NormScale, ParamKind::infer("model.0.bn.weight"));
        assert_eq!(ParamKind::NormScale, ParamKind::infer("encoder.LayerNorm.weight"));
        assert_eq!(ParamKind::NormScale, ParamKind::infer("blocks.1.ln_1.gamma"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("model.9.linear.weight"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("weight"));
        assert_eq!(ParamKind::Bias, ParamKind::infer("bias"));
        assert_eq!(ParamKind::NormScale, ParamKind::infer("model.2.bn1.weight"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("model.2.gnn_layer.weight"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("model.2.bnb.weight"));
        assert_eq!(ParamKind::Weight, ParamKind::infer("model.2.lnk.weight"));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!("weight", ParamKind::Weight.name());
        assert_eq!("norm-scale", ParamKind::NormScale.to_string());
        assert_eq!(ParamKind::NormScale, ParamKind::from("norm-scale"));
        assert_eq!("embedding", ParamKind::from("embedding").name());
        assert!(matches!(ParamKind::custom("embedding"), ParamKind::Other(_)));
    }

    #[test]
    fn test_custom_never_shadows_builtin_kinds() {
        assert_eq!(ParamKind::Weight, ParamKind::custom("weight"));
        assert_eq!(ParamKind::Bias, ParamKind::custom(String::from("bias")));
        assert_eq!(ParamKind::NormScale, ParamKind::custom("norm-scale"));
    }

    #[test]
    fn test_kind_decode_resolves_builtin_names() {
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec("bias", config).unwrap();
        let (kind, _): (ParamKind, usize) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(ParamKind::Bias, kind);
    }

    #[test]
    fn test_layout_ranges() {
        let mut layout = ParameterLayout::new();
        let w = layout.add("fc.weight", ParamKind::Weight, 6).unwrap();
        let b = layout.add("fc.bias", ParamKind::Bias, 2).unwrap();
        let s = layout.add_inferred("bn.weight", 3).unwrap();

        assert_eq!(3, layout.len());
        assert_eq!(11, layout.n_weights());
        assert_eq!(Some(0..6), layout.range(w));
        assert_eq!(Some(6..8), layout.range(b));
        assert_eq!(Some(8..11), layout.range(s));
        assert_eq!(None, layout.range(ParamId::new(3)));
        assert_eq!(ParamKind::NormScale, layout.get(s).unwrap().kind);
        assert_eq!(Some(b), layout.id_of("fc.bias"));
        assert_eq!(
            vec![
                (w, ParamKind::Weight),
                (b, ParamKind::Bias),
                (s, ParamKind::NormScale),
            ],
            layout.params().collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_layout_rejects_invalid_params() {
        let mut layout = ParameterLayout::new();
        assert!(layout.add("", ParamKind::Weight, 1).is_err());
        assert!(layout.add("fc.weight", ParamKind::Weight, 0).is_err());
        layout.add("fc.weight", ParamKind::Weight, 1).unwrap();
        assert!(layout.add("fc.weight", ParamKind::Bias, 1).is_err());
        assert_eq!(1, layout.len());
    }

    #[test]
    fn test_empty_layout() {
        let layout = ParameterLayout::new();
        assert!(layout.is_empty());
        assert_eq!(0, layout.n_weights());
        assert_eq!(0, layout.params().count());
    }

    #[test]
    fn test_layout_decode_rebuilds_offsets() {
        let mut layout = ParameterLayout::new();
        layout.add("conv.weight", ParamKind::Weight, 4).unwrap();
        layout.add("conv.bias", ParamKind::Bias, 2).unwrap();

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&layout, config).unwrap();
        let (decoded, _): (ParameterLayout, usize) =
            bincode::decode_from_slice(&bytes, config).unwrap();

        assert_eq!(layout.specs(), decoded.specs());
        assert_eq!(Some(4..6), decoded.range(ParamId::new(1)));
        assert_eq!(Some(ParamId::new(0)), decoded.id_of("conv.weight"));
    }
}
