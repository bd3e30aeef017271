// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message lifecycle engine for Rekindle.
//!
//! Five cooperating pieces around one store:
//! - [`scheduler`] turns a new client into future-dated messages,
//! - [`dispatcher`] sweeps due messages through delivery with retries,
//! - [`correlator`] resolves inbound SMS into opt-outs and replies,
//! - [`scorer`] recomputes engagement from reply history,
//! - [`personalizer`] renders template bodies, pure and total.
//!
//! [`intake`] is the client-creation boundary that triggers scheduling;
//! [`referrals`] records leads and their engagement credit.

pub mod correlator;
pub mod dispatcher;
pub mod intake;
pub mod notifications;
pub mod personalizer;
pub mod referrals;
pub mod scheduler;
pub mod scorer;

pub use correlator::{Correlator, InboundOutcome, InboundSms, OPT_OUT_KEYWORDS};
pub use dispatcher::{Dispatcher, SweepStats};
