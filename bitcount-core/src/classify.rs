// ============================================================================
// bitcount-core/src/classify.rs
// ============================================================================
//
// CLASSIFICATION: Mapping Syntax-Element Names to Bit Buckets
//
// The decoder reports bits per syntax element. Each element name maps to
// one of three buckets through a static lookup: prediction, residual, or the
// catch-all "other". Names in the exclusion set (aggregate rows such as the
// NAL unit body total) are dropped so they are not counted twice.
//
// Lookups are exact string comparisons. Exclusion wins over both named sets.
//
// AI-ASSISTANT-INFO: Static syntax-element classification tables

// ---- Internal crate imports ----
use crate::error::{CoreResult, config_error};

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::collections::BTreeSet;

// ============================================================================
// DEFAULT TABLES
// ============================================================================

/// Syntax elements that carry prediction information.
pub const DEFAULT_PREDICTION_ELEMENTS: &[&str] = &[
    "CABAC_BITS__SKIP_FLAG",
    "CABAC_BITS__MERGE_FLAG",
    "CABAC_BITS__MERGE_INDEX",
    "CABAC_BITS__MVP_IDX",
    "CABAC_BITS__PRED_MODE",
    "CABAC_BITS__INTRA_DIR_ANG",
    "CABAC_BITS__INTER_DIR",
    "CABAC_BITS__REF_FRM_IDX",
    "CABAC_BITS__MVD",
    "CABAC_BITS__MVD_EP",
    "CABAC_BITS__CROSS_COMPONENT_PREDICTION",
];

/// Syntax elements that carry transform residual information.
pub const DEFAULT_RESIDUAL_ELEMENTS: &[&str] = &[
    "CABAC_BITS__TQ_BYPASS_FLAG",
    "CABAC_BITS__TRANSFORM_SUBDIV_FLAG",
    "CABAC_BITS__QT_ROOT_CBF",
    "CABAC_BITS__DELTA_QP_EP",
    "CABAC_BITS__CHROMA_QP_ADJUSTMENT",
    "CABAC_BITS__QT_CBF",
    "CABAC_BITS__TRANSFORM_SKIP_FLAGS",
    "CABAC_BITS__LAST_SIG_X_Y",
    "CABAC_BITS__SIG_COEFF_GROUP_FLAG",
    "CABAC_BITS__SIG_COEFF_MAP_FLAG",
    "CABAC_BITS__GT1_FLAG",
    "CABAC_BITS__GT2_FLAG",
    "CABAC_BITS__SIGN_BIT",
    "CABAC_BITS__ESCAPE_BITS",
    "EXPLICIT_RDPCM_BITS",
    "CABAC_EP_BIT_ALIGNMENT",
    "CABAC_BITS__ALIGNED_SIGN_BIT",
    "CABAC_BITS__ALIGNED_ESCAPE_BITS",
];

/// Aggregate rows that would double count if summed.
pub const DEFAULT_EXCLUDED_ELEMENTS: &[&str] = &["NAL_UNIT_TOTAL_BODY"];

// ============================================================================
// TYPES
// ============================================================================

/// Destination bucket for a syntax element's bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Prediction,
    Residual,
    Other,
}

/// Lookup tables deciding which bucket a syntax element belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationTable {
    prediction: BTreeSet<String>,
    residual: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_PREDICTION_ELEMENTS.iter().copied(),
            DEFAULT_RESIDUAL_ELEMENTS.iter().copied(),
            DEFAULT_EXCLUDED_ELEMENTS.iter().copied(),
        )
    }
}

impl ClassificationTable {
    /// Creates a table from explicit name lists. Call [`validate`] before use
    /// if the lists come from user input.
    ///
    /// [`validate`]: ClassificationTable::validate
    pub fn new<P, R, E>(prediction: P, residual: R, excluded: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            prediction: prediction.into_iter().map(Into::into).collect(),
            residual: residual.into_iter().map(Into::into).collect(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the bucket for `name`, or `None` when the element is excluded.
    pub fn classify(&self, name: &str) -> Option<Bucket> {
        if self.is_excluded(name) {
            None
        } else if self.prediction.contains(name) {
            Some(Bucket::Prediction)
        } else if self.residual.contains(name) {
            Some(Bucket::Residual)
        } else {
            Some(Bucket::Other)
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Checks that the prediction and residual sets are disjoint.
    pub fn validate(&self) -> CoreResult<()> {
        let overlap: Vec<&str> = self
            .prediction
            .intersection(&self.residual)
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(config_error(format!(
                "syntax elements listed as both prediction and residual: {}",
                overlap.join(", ")
            )));
        }
        Ok(())
    }
}
