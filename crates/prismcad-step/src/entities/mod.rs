//! STEP entity parsing and formatting helpers.
//!
//! Each submodule turns raw [`StepEntity`] records into typed values for the
//! reader, and formats entity bodies (without the `#id=` prefix) for the
//! writer.

mod curves;
mod geometry;
mod surfaces;
mod topology;

pub use curves::*;
pub use geometry::*;
pub use surfaces::*;
pub use topology::*;

use crate::error::StepError;
use crate::parser::{StepEntity, StepFile, StepValue};

/// Positional attribute access with errors that name the instance.
pub trait Attributes {
    /// Real or integer attribute.
    fn real(&self, idx: usize) -> Result<f64, StepError>;

    /// `#id` attribute.
    fn reference(&self, idx: usize) -> Result<u64, StepError>;

    /// Aggregate attribute.
    fn aggregate(&self, idx: usize) -> Result<&[StepValue], StepError>;

    /// `.T.` or `.F.`; anything else, `.U.` included, reads as false.
    fn flag(&self, idx: usize) -> Result<bool, StepError>;

    /// Aggregate of reals, e.g. coordinates.
    fn reals(&self, idx: usize) -> Result<Vec<f64>, StepError>;

    /// Aggregate of references.
    fn references(&self, idx: usize) -> Result<Vec<u64>, StepError>;

    /// `$` or past the end.
    fn omitted(&self, idx: usize) -> bool;
}

impl StepEntity {
    fn attribute<'a, T>(
        &'a self,
        idx: usize,
        kind: &str,
        read: impl FnOnce(&'a StepValue) -> Option<T>,
    ) -> Result<T, StepError> {
        self.args.get(idx).and_then(read).ok_or_else(|| {
            StepError::parser(
                Some(self.id),
                format!("expected {kind} at arg {idx} in {}", self.type_name),
            )
        })
    }

    fn members<T>(
        &self,
        idx: usize,
        kind: &str,
        read: impl Fn(&StepValue) -> Option<T>,
    ) -> Result<Vec<T>, StepError> {
        let mut out = Vec::new();
        for (i, v) in self.aggregate(idx)?.iter().enumerate() {
            match read(v) {
                Some(item) => out.push(item),
                None => {
                    return Err(StepError::parser(
                        Some(self.id),
                        format!("arg {idx} item {i} of {} is not a {kind}", self.type_name),
                    ))
                }
            }
        }
        Ok(out)
    }
}

impl Attributes for StepEntity {
    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.attribute(idx, "real", StepValue::as_real)
    }

    fn reference(&self, idx: usize) -> Result<u64, StepError> {
        self.attribute(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn aggregate(&self, idx: usize) -> Result<&[StepValue], StepError> {
        self.attribute(idx, "list", StepValue::as_list)
    }

    fn flag(&self, idx: usize) -> Result<bool, StepError> {
        let value = self.attribute(idx, "logical", StepValue::as_enum)?;
        Ok(matches!(value, "T" | "TRUE"))
    }

    fn reals(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        self.members(idx, "real", StepValue::as_real)
    }

    fn references(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        self.members(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn omitted(&self, idx: usize) -> bool {
        self.args.get(idx).map_or(true, |v| *v == StepValue::Null)
    }
}

/// Instance `id`, which must be one of `types`; the first type names the
/// expectation in the error.
pub fn expect_type<'a>(
    file: &'a StepFile,
    id: u64,
    types: &[&str],
) -> Result<&'a StepEntity, StepError> {
    let entity = file.require(id)?;
    if types.contains(&entity.type_name.as_str()) {
        Ok(entity)
    } else {
        let wanted = types.first().copied().unwrap_or_default();
        Err(StepError::type_mismatch(wanted, &entity.type_name))
    }
}

/// Format a list of entity references, e.g. `(#1,#2)`.
pub fn ref_list(ids: &[u64]) -> String {
    let refs: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
    format!("({})", refs.join(","))
}

/// Format a STEP boolean.
pub fn logical(value: bool) -> &'static str {
    if value {
        ".T."
    } else {
        ".F."
    }
}

/// Format a real the way Part 21 expects: always with a decimal point.
pub fn real(value: f64) -> String {
    // {:E} gives "1E0"; Part 21 wants "1.E0"
    let s = format!("{:E}", value);
    match s.split_once('E') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.E{exp}"),
        _ => s,
    }
}
