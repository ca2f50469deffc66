use carty_core::search::TripPayload;
use carty_order::CheckoutDraft;
use carty_shared::models::TempBookingId;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Pages of the front end, each carrying the state handed to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Home,
    Login,
    Register,
    CarList {
        temp_id: Option<TempBookingId>,
        trip: Option<TripPayload>,
    },
    CarDetail {
        car_id: i64,
        temp_id: Option<TempBookingId>,
        pickup_datetime: Option<String>,
        drop_datetime: Option<String>,
    },
    Confirmation(Box<CheckoutDraft>),
    ThankYou,
    MyBookings,
    BookCar {
        car_id: i64,
    },
    Payment {
        booking_id: i64,
    },
    Notifications,
}

/// History stack plus the alerts raised along the way.
pub struct Navigator {
    history: Mutex<Vec<Page>>,
    alerts: Mutex<Vec<String>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(vec![Page::Home]),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub async fn current(&self) -> Page {
        self.history
            .lock()
            .await
            .last()
            .cloned()
            .unwrap_or(Page::Home)
    }

    pub async fn push(&self, page: Page) {
        debug!(?page, "navigate");
        self.history.lock().await.push(page);
    }

    /// Goes one page back; the first page is never popped.
    pub async fn back(&self) -> Page {
        let mut history = self.history.lock().await;
        if history.len() > 1 {
            history.pop();
        }
        let current = history.last().cloned().unwrap_or(Page::Home);
        debug!(page = ?current, "navigate back");
        current
    }

    pub async fn depth(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "alert");
        self.alerts.lock().await.push(message);
    }

    pub async fn alerts(&self) -> Vec<String> {
        self.alerts.lock().await.clone()
    }

    pub async fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut *self.alerts.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_back_stops_at_first_page() {
        let nav = Navigator::new();
        nav.push(Page::MyBookings).await;
        nav.push(Page::Payment { booking_id: 3 }).await;
        assert_eq!(nav.back().await, Page::MyBookings);
        assert_eq!(nav.back().await, Page::Home);
        assert_eq!(nav.back().await, Page::Home);
        assert_eq!(nav.depth().await, 1);
    }

    #[tokio::test]
    async fn test_alerts_are_collected() {
        let nav = Navigator::new();
        nav.alert("Booking confirmed!").await;
        assert_eq!(nav.take_alerts().await, vec!["Booking confirmed!".to_string()]);
        assert!(nav.alerts().await.is_empty());
    }
}
