//! # Defect Priority
//!
//! When a request carries several defects at once, only the highest-ranked
//! one is reported. Ranking is endpoint-specific: endpoints disagree on where
//! `TooManySignatures` sits relative to missing fields and missing resources.
//!
//! An endpoint records every defect it can observe into `Defects` (lookups
//! are attempted even when a later check is known to fail, so `NotFound` can
//! surface at its rank), then asks its `CheckOrder` for the winner. Within a
//! single kind, the defect recorded first wins.

use super::errors::{DefectKind, RequestError};

/// Explicit, ordered list of defect kinds for one endpoint. Highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOrder {
    name: &'static str,
    kinds: &'static [DefectKind],
}

impl CheckOrder {
    pub const fn new(name: &'static str, kinds: &'static [DefectKind]) -> Self {
        Self { name, kinds }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kinds(&self) -> &'static [DefectKind] {
        self.kinds
    }

    /// Position of `kind` in this order; unlisted kinds rank last.
    pub fn rank(&self, kind: DefectKind) -> usize {
        self.kinds
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.kinds.len())
    }

    /// The highest-ranked defect, if any.
    pub fn select(&self, defects: Defects) -> Option<RequestError> {
        defects
            .found
            .into_iter()
            .enumerate()
            .min_by_key(|(seq, err)| (self.rank(err.kind()), *seq))
            .map(|(_, err)| err)
    }

    /// `Ok(())` when no defect was recorded, otherwise the winner.
    pub fn check(&self, defects: Defects) -> Result<(), RequestError> {
        match self.select(defects) {
            None => Ok(()),
            Some(err) => {
                tracing::debug!(endpoint = self.name, defect = %err.kind(), "request rejected");
                Err(err)
            }
        }
    }
}

/// Defects observed while processing one request, in observation order.
#[derive(Debug, Clone, Default)]
pub struct Defects {
    found: Vec<RequestError>,
}

impl Defects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, err: RequestError) {
        self.found.push(err);
    }

    /// Record the error of a failed result and return its success value.
    pub fn take<T>(&mut self, result: Result<T, RequestError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn kinds(&self) -> Vec<DefectKind> {
        self.found.iter().map(RequestError::kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SignerRole;
    use shared_types::EntityKind;

    const ORDER: CheckOrder = CheckOrder::new(
        "test",
        &[
            DefectKind::MissingField,
            DefectKind::NotFound,
            DefectKind::TooManySignatures,
            DefectKind::InvalidSignature,
        ],
    );

    #[test]
    fn test_empty_defects_pass() {
        assert_eq!(ORDER.check(Defects::new()), Ok(()));
    }

    #[test]
    fn test_highest_rank_wins_regardless_of_observation_order() {
        let mut defects = Defects::new();
        defects.record(RequestError::InvalidSignature {
            role: SignerRole::Profile,
        });
        defects.record(RequestError::TooManySignatures { count: 3, max: 2 });
        defects.record(RequestError::not_found(EntityKind::Device, "d"));

        let winner = ORDER.select(defects).unwrap();
        assert_eq!(winner.kind(), DefectKind::NotFound);
    }

    #[test]
    fn test_first_recorded_wins_within_kind() {
        let mut defects = Defects::new();
        defects.record(RequestError::not_found(EntityKind::Exp, "e"));
        defects.record(RequestError::not_found(EntityKind::Device, "d"));

        assert_eq!(
            ORDER.select(defects),
            Some(RequestError::not_found(EntityKind::Exp, "e"))
        );
    }

    #[test]
    fn test_unlisted_kind_ranks_last() {
        let mut defects = Defects::new();
        defects.record(RequestError::MalformedData("x".into()));
        defects.record(RequestError::InvalidSignature {
            role: SignerRole::Device,
        });

        assert_eq!(ORDER.select(defects).unwrap().kind(), DefectKind::InvalidSignature);
    }

    #[test]
    fn test_take_records_errors() {
        let mut defects = Defects::new();
        assert_eq!(defects.take::<u8>(Ok(1)), Some(1));
        assert_eq!(defects.take::<u8>(Err(RequestError::missing("f"))), None);
        assert_eq!(defects.kinds(), vec![DefectKind::MissingField]);
    }
}
