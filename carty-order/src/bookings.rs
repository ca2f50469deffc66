use carty_core::{CoreError, CoreResult, Credentials, RentalBackend};
use carty_shared::models::booking::parse_timestamp;
use carty_shared::models::{Booking, CreateBookingRequest, Payment, PaymentRequest};
use carty_shared::Money;
use tracing::info;

/// Direct booking of a car by id, outside the search flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookCarForm {
    pub car_id: i64,
    pub start_date: String,
    pub end_date: String,
    /// Optional; blank means no driver.
    pub driver_id: String,
}

impl BookCarForm {
    pub fn new(car_id: i64) -> Self {
        Self {
            car_id,
            ..Self::default()
        }
    }

    pub fn to_request(&self, customer_id: Option<i64>) -> CoreResult<CreateBookingRequest> {
        let start = self.start_date.trim();
        let end = self.end_date.trim();
        if start.is_empty() || end.is_empty() {
            return Err(CoreError::ValidationError(
                "Start and end date are required".to_string(),
            ));
        }
        if let (Some(s), Some(e)) = (parse_timestamp(start), parse_timestamp(end)) {
            if e <= s {
                return Err(CoreError::ValidationError(
                    "End date must be after the start date".to_string(),
                ));
            }
        }
        let driver_id = match self.driver_id.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| {
                CoreError::ValidationError(format!("Invalid driver id '{}'", raw))
            })?),
        };
        Ok(CreateBookingRequest {
            customer_id,
            car_id: self.car_id,
            driver_id,
            start_date: start.to_string(),
            end_date: end.to_string(),
        })
    }

    pub async fn submit(
        &self,
        backend: &dyn RentalBackend,
        credentials: &Credentials,
        customer_id: Option<i64>,
    ) -> CoreResult<Booking> {
        let request = self.to_request(customer_id)?;
        let booking = backend.create_booking(credentials, &request).await?;
        info!(booking_id = booking.id, car_id = self.car_id, "booking created");
        Ok(booking)
    }
}

/// Pays for an existing booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    pub booking_id: i64,
    pub amount: Money,
    pub payment_method: String,
}

impl PaymentForm {
    /// The amount comes from the booking's total cost.
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            amount: booking.total_cost.unwrap_or(Money::ZERO),
            payment_method: String::new(),
        }
    }

    pub fn to_request(&self) -> CoreResult<PaymentRequest> {
        let method = self.payment_method.trim();
        if method.is_empty() {
            return Err(CoreError::ValidationError(
                "Payment method is required".to_string(),
            ));
        }
        Ok(PaymentRequest {
            booking_id: self.booking_id,
            amount: self.amount,
            payment_method: method.to_string(),
        })
    }

    pub async fn submit(
        &self,
        backend: &dyn RentalBackend,
        credentials: &Credentials,
    ) -> CoreResult<Payment> {
        let request = self.to_request()?;
        let payment = backend.create_payment(credentials, &request).await?;
        info!(booking_id = self.booking_id, amount = %self.amount, "payment recorded");
        Ok(payment)
    }
}

/// Keeps the bookings that belong to `user_id`.
pub fn bookings_for(bookings: Vec<Booking>, user_id: Option<i64>) -> Vec<Booking> {
    match user_id {
        Some(id) => bookings
            .into_iter()
            .filter(|b| b.customer_id() == Some(id))
            .collect(),
        None => bookings,
    }
}
