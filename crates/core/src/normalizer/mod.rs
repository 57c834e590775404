//! Applies the classifier to the three instruction-level representations of a
//! function: raw instructions, low-level IR, and mid-level IR.

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::model::{AddressContext, NormalizedInstruction, RawToken, Representation};

/// Token streams of one function as reported by the host, one inner `Vec`
/// per instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionStreams {
    #[serde(default)]
    pub instructions: Vec<Vec<RawToken>>,
    #[serde(default)]
    pub llil: Vec<Vec<RawToken>>,
    #[serde(default)]
    pub mlil: Vec<Vec<RawToken>>,
}

/// Normalized output, parallel to [`FunctionStreams`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFunction {
    pub instructions: Vec<NormalizedInstruction>,
    pub llils: Vec<NormalizedInstruction>,
    pub mlils: Vec<NormalizedInstruction>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    classifier: Classifier,
}

impl Normalizer {
    pub fn new(numeric_threshold: i128) -> Self {
        Self { classifier: Classifier::new(numeric_threshold) }
    }

    /// Normalize all three streams of a function.
    pub fn normalize(
        &self,
        streams: &FunctionStreams,
        ctx: &AddressContext<'_>,
    ) -> NormalizedFunction {
        NormalizedFunction {
            instructions: self.normalize_stream(
                Representation::Instructions,
                &streams.instructions,
                ctx,
            ),
            llils: self.normalize_stream(Representation::Llil, &streams.llil, ctx),
            mlils: self.normalize_stream(Representation::Mlil, &streams.mlil, ctx),
        }
    }

    /// Normalize one stream. String literals are only rewritten for MLIL.
    pub fn normalize_stream(
        &self,
        repr: Representation,
        stream: &[Vec<RawToken>],
        ctx: &AddressContext<'_>,
    ) -> Vec<NormalizedInstruction> {
        let classifier = self.classifier.with_string_rewrite(repr == Representation::Mlil);
        stream
            .iter()
            .map(|inst| inst.iter().map(|token| classifier.classify(token, ctx)).collect())
            .collect()
    }
}
