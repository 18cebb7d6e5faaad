//! `OutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ts_core::{Asn, MoteId};
use ts_mote::{Action, PacketEvent, ParentChange};
use ts_sim::{RunSummary, SimObserver};

use crate::writer::OutputWriter;
use crate::{LogRecord, OutputError, OutputResult, SummaryRow};

/// A [`SimObserver`] that turns run events into [`LogRecord`]s for any
/// [`OutputWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct OutputObserver<W: OutputWriter> {
    writer:         W,
    run_id:         u32,
    trace_dispatch: bool,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> OutputObserver<W> {
    pub fn new(writer: W, run_id: u32) -> Self {
        Self { writer, run_id, trace_dispatch: false, last_error: None }
    }

    /// Also log every dispatched event.  Off by default: a long run
    /// dispatches far more events than it produces protocol records.
    pub fn with_dispatch_trace(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write(&mut self, record: LogRecord) {
        let result = self.writer.write_record(&record);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for OutputObserver<W> {
    fn on_dispatch(&mut self, asn: Asn, target: MoteId, action: Action) {
        if self.trace_dispatch {
            self.write(LogRecord::Dispatch { asn, mote: target, action: action.name() });
        }
    }

    fn on_sync(&mut self, asn: Asn, mote: MoteId) {
        self.write(LogRecord::Sync { asn, mote });
    }

    fn on_parent_change(&mut self, asn: Asn, mote: MoteId, change: &ParentChange) {
        self.write(LogRecord::ParentChange {
            asn,
            mote,
            old: change.old.map(|p| p.mote),
            new: change.new.map(|p| p.mote),
            rank: change.rank,
        });
    }

    fn on_packet(&mut self, event: &PacketEvent) {
        self.write(LogRecord::Packet {
            asn:  event.asn,
            mote: event.mote,
            src:  event.body.src,
            dst:  event.body.dst,
            seq:  event.body.seq,
            hops: event.body.hops,
            fate: event.fate,
        });
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.write(LogRecord::RunEnd {
            asn:       summary.end,
            events:    summary.events,
            joined:    summary.joined,
            generated: summary.generated,
            delivered: summary.delivered,
            dropped:   summary.dropped,
        });
        for mote in &summary.motes {
            self.write(LogRecord::MoteSummary(SummaryRow::new(self.run_id, mote)));
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
