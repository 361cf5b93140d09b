//! Applies generated values to instruments.

use pdg_core::error::{PdgError, Result};
use pdg_core::model::{GaugeOp, SequenceSpec};
use pdg_core::value::Sample;

use crate::obs::Instrument;

/// Apply one tick's value using the operation implied by the instrument kind.
///
/// | kind      | effect                       |
/// |-----------|------------------------------|
/// | counter   | increment                    |
/// | gauge     | `inc`, `dec` or `set` per op |
/// | summary   | observe                      |
/// | histogram | observe into buckets         |
///
/// A gauge sequence without an operation yields
/// [`PdgError::MissingOperation`] and leaves the instrument untouched.
pub fn apply(
    instrument: &Instrument,
    sequence: usize,
    seq: &SequenceSpec,
    value: Sample,
) -> Result<()> {
    let v = value.as_f64();
    let labels = &seq.label_values;

    match instrument {
        Instrument::Counter(f) => f.with_label_values(labels)?.inc(v),
        Instrument::Gauge(f) => {
            let op = seq.operation.ok_or_else(|| PdgError::MissingOperation {
                metric: f.name().to_string(),
                sequence,
            })?;
            let g = f.with_label_values(labels)?;
            match op {
                GaugeOp::Inc => g.inc(v),
                GaugeOp::Dec => g.dec(v),
                GaugeOp::Set => g.set(v),
            }
        }
        Instrument::Summary(f) => f.with_label_values(labels)?.observe(v),
        Instrument::Histogram(f) => f.with_label_values(labels)?.observe(v),
    }
    Ok(())
}
