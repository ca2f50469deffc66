use carty_shared::models::{ConfirmBookingRequest, TempBookingId};
use carty_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "UPI")]
    Upi,
    Card,
    NetBanking,
}

impl PaymentMethod {
    /// Name sent as `payment_method` to the backend.
    pub fn wire_name(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::NetBanking => "NetBanking",
        }
    }

    pub fn from_wire(raw: &str) -> Option<PaymentMethod> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upi" => Some(PaymentMethod::Upi),
            "card" => Some(PaymentMethod::Card),
            "netbanking" | "net_banking" => Some(PaymentMethod::NetBanking),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpiApp {
    Gpay,
    #[serde(rename = "phonepay")]
    PhonePe,
    Paytm,
}

impl UpiApp {
    pub const ALL: [UpiApp; 3] = [UpiApp::Gpay, UpiApp::PhonePe, UpiApp::Paytm];

    pub fn code(self) -> &'static str {
        match self {
            UpiApp::Gpay => "gpay",
            UpiApp::PhonePe => "phonepay",
            UpiApp::Paytm => "paytm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UpiApp::Gpay => "Google Pay",
            UpiApp::PhonePe => "Phone Pe",
            UpiApp::Paytm => "Paytm UPI",
        }
    }

    pub fn from_code(raw: &str) -> Option<UpiApp> {
        UpiApp::ALL.into_iter().find(|app| app.code() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Sbi,
    Hdfc,
    Icici,
}

impl Bank {
    pub const ALL: [Bank; 3] = [Bank::Sbi, Bank::Hdfc, Bank::Icici];

    pub fn code(self) -> &'static str {
        match self {
            Bank::Sbi => "sbi",
            Bank::Hdfc => "hdfc",
            Bank::Icici => "icici",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bank::Sbi => "State Bank of India",
            Bank::Hdfc => "HDFC Bank",
            Bank::Icici => "ICICI Bank",
        }
    }

    pub fn from_code(raw: &str) -> Option<Bank> {
        Bank::ALL.into_iter().find(|bank| bank.code() == raw.trim())
    }
}

/// Card sub-form. Number and CVV never show up in logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDetails {
    pub number: Masked<String>,
    pub expiry: String,
    pub cvv: Masked<String>,
    pub name_on_card: String,
    pub save_card: bool,
}

/// What the customer has picked on the payment panel.
///
/// Each method carries its own sub-form, so switching methods always starts
/// the new sub-form empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PaymentSelection {
    #[default]
    Unselected,
    Upi(Option<UpiApp>),
    Card(CardDetails),
    NetBanking(Option<Bank>),
}

impl PaymentSelection {
    pub fn choose(&mut self, method: PaymentMethod) {
        *self = match method {
            PaymentMethod::Upi => PaymentSelection::Upi(None),
            PaymentMethod::Card => PaymentSelection::Card(CardDetails::default()),
            PaymentMethod::NetBanking => PaymentSelection::NetBanking(None),
        };
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        match self {
            PaymentSelection::Unselected => None,
            PaymentSelection::Upi(_) => Some(PaymentMethod::Upi),
            PaymentSelection::Card(_) => Some(PaymentMethod::Card),
            PaymentSelection::NetBanking(_) => Some(PaymentMethod::NetBanking),
        }
    }

    pub fn select_upi_app(&mut self, app: UpiApp) -> CoreResult<()> {
        match self {
            PaymentSelection::Upi(slot) => {
                *slot = Some(app);
                Ok(())
            }
            _ => Err(CoreError::ValidationError("UPI is not the selected method".to_string())),
        }
    }

    pub fn select_bank(&mut self, bank: Bank) -> CoreResult<()> {
        match self {
            PaymentSelection::NetBanking(slot) => {
                *slot = Some(bank);
                Ok(())
            }
            _ => Err(CoreError::ValidationError(
                "Net banking is not the selected method".to_string(),
            )),
        }
    }

    pub fn card_mut(&mut self) -> Option<&mut CardDetails> {
        match self {
            PaymentSelection::Card(card) => Some(card),
            _ => None,
        }
    }

    /// The "Pay" button is enabled only when the chosen method is complete enough.
    pub fn can_pay(&self) -> bool {
        match self {
            PaymentSelection::Unselected => false,
            PaymentSelection::Upi(app) => app.is_some(),
            PaymentSelection::Card(card) => !card.number.is_blank(),
            PaymentSelection::NetBanking(bank) => bank.is_some(),
        }
    }

    pub fn confirm_request(
        &self,
        temp_id: Option<TempBookingId>,
        car_id: i64,
        plan: &str,
    ) -> CoreResult<ConfirmBookingRequest> {
        let method = match self.method() {
            Some(method) if self.can_pay() => method,
            _ => {
                return Err(CoreError::ValidationError(
                    "Please complete the payment details".to_string(),
                ))
            }
        };
        Ok(ConfirmBookingRequest {
            temp_id,
            payment_method: method.wire_name().to_string(),
            car_id,
            plan: plan.to_string(),
        })
    }
}
