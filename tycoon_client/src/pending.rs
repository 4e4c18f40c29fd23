// Blocking rendezvous for the multi-round counter-play protocols.
//
// A rent or theft play must not return to the caller until every targeted
// opponent has answered, but the answers arrive on the dispatch thread. The
// primitives here suspend the initiating thread on a condition variable —
// never a polled flag — until the dispatch thread resolves the exchange or
// the connection dies.
//
// Correlation is by construction: a client has at most one rent demand and
// one theft demand of its own in flight (the initiating call blocks), so a
// response naming us as initiator belongs to the stored request. A response
// arriving when nothing is outstanding has no home, and that is the fatal
// `ProtocolError::UnexpectedResponse`.

use std::sync::{Condvar, Mutex, PoisonError};

use thiserror::Error;
use tycoon_engine::{Card, RentRequest, TheftRequest};

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A response arrived with no outstanding request. Indicates duplicate
    /// or misrouted delivery; fatal for the session.
    #[error("response received with no outstanding request")]
    UnexpectedResponse,
    /// The wait was cancelled, typically because the connection closed.
    #[error("wait cancelled: {0}")]
    Cancelled(String),
}

#[derive(Default)]
struct RentInner {
    /// The demand currently in flight, kept for Just-Say-No re-sends.
    request: Option<RentRequest>,
    /// Responses still owed. The wait ends when this reaches zero.
    outstanding: u32,
    /// Payments buffered until every rentee has answered.
    assets: Vec<Card>,
    cancelled: Option<String>,
}

/// Rendezvous for one in-flight rent demand. `begin` arms it with N
/// outstanding responses; the dispatch thread resolves them one by one;
/// `wait` blocks until the count converges to zero and yields the buffered
/// assets.
pub struct RentRendezvous {
    inner: Mutex<RentInner>,
    signal: Condvar,
}

impl Default for RentRendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl RentRendezvous {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RentInner::default()),
            signal: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the rendezvous for `request`, owing one response per rentee.
    pub fn begin(&self, request: RentRequest) {
        let mut inner = self.lock();
        inner.outstanding = request.rentees.len() as u32;
        inner.request = Some(request);
        inner.assets.clear();
        inner.cancelled = None;
    }

    /// The demand currently in flight, if any.
    pub fn request(&self) -> Option<RentRequest> {
        self.lock().request.clone()
    }

    /// One more response is owed: called when a rejection is countered with
    /// a Just Say No and the demand is re-sent to that rentee. Must precede
    /// resolving the rejection itself so the waiter cannot wake early.
    pub fn add_rentee(&self) -> Result<(), ProtocolError> {
        let mut inner = self.lock();
        if inner.request.is_none() || inner.outstanding == 0 {
            return Err(ProtocolError::UnexpectedResponse);
        }
        inner.outstanding += 1;
        Ok(())
    }

    /// Account one response, buffering whatever assets it carried.
    pub fn resolve(&self, assets: Vec<Card>) -> Result<(), ProtocolError> {
        let mut inner = self.lock();
        if inner.request.is_none() || inner.outstanding == 0 {
            return Err(ProtocolError::UnexpectedResponse);
        }
        inner.assets.extend(assets);
        inner.outstanding -= 1;
        if inner.outstanding == 0 {
            self.signal.notify_all();
        }
        Ok(())
    }

    /// Block until every outstanding response is accounted for, then return
    /// the buffered assets.
    pub fn wait(&self) -> Result<Vec<Card>, ProtocolError> {
        let mut inner = self.lock();
        loop {
            if let Some(reason) = inner.cancelled.take() {
                inner.request = None;
                inner.assets.clear();
                return Err(ProtocolError::Cancelled(reason));
            }
            if inner.outstanding == 0 {
                inner.request = None;
                return Ok(std::mem::take(&mut inner.assets));
            }
            inner = self
                .signal
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wake a blocked waiter with an error. Used on disconnect.
    pub fn cancel(&self, reason: &str) {
        let mut inner = self.lock();
        if inner.request.is_some() {
            inner.cancelled = Some(reason.to_string());
            self.signal.notify_all();
        }
    }
}

#[derive(Default)]
struct TheftInner {
    /// The demand in flight, kept verbatim for Just-Say-No re-sends.
    request: Option<TheftRequest>,
    outcome: Option<bool>,
    cancelled: Option<String>,
}

/// Rendezvous for one in-flight theft demand: exactly one response settles
/// it. A countered rejection simply never resolves — the dispatch thread
/// re-sends the stored request and the waiter keeps waiting.
pub struct TheftRendezvous {
    inner: Mutex<TheftInner>,
    signal: Condvar,
}

impl Default for TheftRendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl TheftRendezvous {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TheftInner::default()),
            signal: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TheftInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self, request: TheftRequest) {
        let mut inner = self.lock();
        inner.request = Some(request);
        inner.outcome = None;
        inner.cancelled = None;
    }

    pub fn request(&self) -> Option<TheftRequest> {
        self.lock().request.clone()
    }

    /// Settle the exchange with the victim's verdict.
    pub fn resolve(&self, accepted: bool) -> Result<(), ProtocolError> {
        let mut inner = self.lock();
        if inner.request.is_none() || inner.outcome.is_some() {
            return Err(ProtocolError::UnexpectedResponse);
        }
        inner.outcome = Some(accepted);
        self.signal.notify_all();
        Ok(())
    }

    /// Block until the victim's verdict arrives; returns whether the theft
    /// was accepted.
    pub fn wait(&self) -> Result<bool, ProtocolError> {
        let mut inner = self.lock();
        loop {
            if let Some(reason) = inner.cancelled.take() {
                inner.request = None;
                return Err(ProtocolError::Cancelled(reason));
            }
            if let Some(accepted) = inner.outcome.take() {
                inner.request = None;
                return Ok(accepted);
            }
            inner = self
                .signal
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn cancel(&self, reason: &str) {
        let mut inner = self.lock();
        if inner.request.is_some() {
            inner.cancelled = Some(reason.to_string());
            self.signal.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use tycoon_engine::{CardId, CardKind, PropertyColor};

    use super::*;

    fn money(id: u32, value: i32) -> Card {
        Card {
            id: CardId(id),
            name: format!("{value}M"),
            kind: CardKind::Money,
            value,
            color: PropertyColor::None,
            alt_color: PropertyColor::None,
            image_path: String::new(),
            sound_path: String::new(),
            action: None,
            flipped: false,
        }
    }

    fn rent_request(rentees: &[&str]) -> RentRequest {
        RentRequest {
            renter: "Alice".into(),
            rentees: rentees.iter().map(|s| s.to_string()).collect(),
            amount: 3,
            doubled: false,
        }
    }

    fn theft_request() -> TheftRequest {
        TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: tycoon_engine::ActionKind::SlyDeal,
            card_to_give: None,
            cards_to_take: Vec::new(),
        }
    }

    #[test]
    fn rent_counter_converges_to_zero() {
        let rendezvous = Arc::new(RentRendezvous::new());
        rendezvous.begin(rent_request(&["Bob", "Carol", "Dave"]));

        let resolver = rendezvous.clone();
        let handle = thread::spawn(move || {
            resolver.resolve(vec![money(1, 1)]).unwrap();
            resolver.resolve(vec![]).unwrap();
            resolver.resolve(vec![money(2, 5)]).unwrap();
        });

        let assets = rendezvous.wait().unwrap();
        handle.join().unwrap();
        let ids: Vec<u32> = assets.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn resolve_without_request_is_fatal() {
        let rendezvous = RentRendezvous::new();
        assert!(matches!(
            rendezvous.resolve(vec![]),
            Err(ProtocolError::UnexpectedResponse)
        ));
    }

    #[test]
    fn resolve_past_zero_is_fatal() {
        let rendezvous = RentRendezvous::new();
        rendezvous.begin(rent_request(&["Bob"]));
        rendezvous.resolve(vec![]).unwrap();
        assert!(matches!(
            rendezvous.resolve(vec![]),
            Err(ProtocolError::UnexpectedResponse)
        ));
    }

    #[test]
    fn add_rentee_keeps_waiter_blocked() {
        let rendezvous = Arc::new(RentRendezvous::new());
        rendezvous.begin(rent_request(&["Bob"]));

        let resolver = rendezvous.clone();
        let handle = thread::spawn(move || {
            // Counter Bob's rejection: one more response owed, then the
            // rejection itself resolves.
            resolver.add_rentee().unwrap();
            resolver.resolve(vec![]).unwrap();
            thread::sleep(Duration::from_millis(50));
            // Bob's second answer: payment.
            resolver.resolve(vec![money(1, 4)]).unwrap();
        });

        let assets = rendezvous.wait().unwrap();
        handle.join().unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn cancel_wakes_rent_waiter() {
        let rendezvous = Arc::new(RentRendezvous::new());
        rendezvous.begin(rent_request(&["Bob"]));

        let canceller = rendezvous.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel("connection closed");
        });

        assert!(matches!(
            rendezvous.wait(),
            Err(ProtocolError::Cancelled(_))
        ));
        handle.join().unwrap();
    }

    #[test]
    fn theft_single_response_settles() {
        let rendezvous = Arc::new(TheftRendezvous::new());
        rendezvous.begin(theft_request());

        let resolver = rendezvous.clone();
        let handle = thread::spawn(move || {
            resolver.resolve(true).unwrap();
        });

        assert!(rendezvous.wait().unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn theft_double_response_is_fatal() {
        let rendezvous = TheftRendezvous::new();
        rendezvous.begin(theft_request());
        rendezvous.resolve(false).unwrap();
        assert!(matches!(
            rendezvous.resolve(false),
            Err(ProtocolError::UnexpectedResponse)
        ));
    }

    #[test]
    fn theft_request_survives_until_resolved() {
        let rendezvous = TheftRendezvous::new();
        rendezvous.begin(theft_request());
        // A countered rejection re-reads the stored request.
        assert!(rendezvous.request().is_some());
        rendezvous.resolve(true).unwrap();
        assert!(rendezvous.wait().unwrap());
        assert!(rendezvous.request().is_none());
    }

    #[test]
    fn cancel_wakes_theft_waiter() {
        let rendezvous = Arc::new(TheftRendezvous::new());
        rendezvous.begin(theft_request());

        let canceller = rendezvous.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel("connection closed");
        });

        assert!(matches!(
            rendezvous.wait(),
            Err(ProtocolError::Cancelled(_))
        ));
    }
}
