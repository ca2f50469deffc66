use anyhow::{anyhow, Context};
use carty_app::views::{self, bookings::PaymentView, LocationLookup, SearchView};
use carty_app::views::{ConfirmationView, DetailView, ListingView};
use carty_app::{AppError, AppState};
use carty_catalog::PlanTier;
use carty_core::payment::{Bank, PaymentMethod, UpiApp};
use carty_core::search::TripType;
use carty_order::BookCarForm;
use carty_shared::models::booking::format_timestamp;
use carty_shared::models::{Car, TempBookingId};
use carty_store::Config;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "carty", version, about = "Car rental booking client")]
struct Cli {
    /// Directory holding default.toml and friends.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,
    /// Print list and quote results as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// Landing page: top cars, offers, rentals and FAQs.
    Home,
    /// Location suggestions for a partial name.
    Locations {
        text: String,
    },
    /// Submit the trip search and reserve a temp booking.
    Search {
        #[arg(long, default_value = "hourly")]
        trip: String,
        #[arg(long)]
        pickup: String,
        #[arg(long, default_value = "")]
        destination: String,
        #[arg(long, default_value = "")]
        drop: String,
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        start_time: String,
        #[arg(long, default_value = "")]
        return_date: String,
        #[arg(long, default_value = "")]
        return_time: String,
        #[arg(long, default_value = "")]
        package: String,
        #[arg(long, default_value_t = 1)]
        days: u32,
        #[arg(long)]
        no_driver: bool,
    },
    /// Available cars, optionally seeded from a temp booking.
    Cars {
        #[arg(long)]
        temp_id: Option<String>,
        /// Filter override as `field=value`; repeatable.
        #[arg(long = "set")]
        filters: Vec<String>,
    },
    /// Price a car with a plan and coupon.
    Quote {
        car_id: i64,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Select a plan and pay for a car from the search flow.
    Checkout {
        car_id: i64,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        coupon: Option<String>,
        #[arg(long)]
        temp_id: Option<String>,
        /// UPI, Card or NetBanking.
        #[arg(long)]
        method: String,
        /// UPI app code: gpay, phonepay or paytm.
        #[arg(long)]
        app: Option<String>,
        /// Bank code: sbi, hdfc or icici.
        #[arg(long)]
        bank: Option<String>,
        #[arg(long)]
        card_number: Option<String>,
    },
    Bookings,
    /// Book a car directly by id.
    Book {
        car_id: i64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        driver: String,
    },
    /// Pay for an existing booking.
    Pay {
        booking_id: i64,
        #[arg(long)]
        method: String,
    },
    Notifications,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carty=info,carty_app=debug,carty_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir)
        .with_context(|| format!("Failed to load config from {}", cli.config_dir.display()))?;
    let state = AppState::from_config(&config).await?;

    let result = run(&state, cli.command, cli.json).await;
    for alert in state.navigator.take_alerts().await {
        println!("! {}", alert);
    }
    result.map_err(|e| anyhow!(e.message()))
}

async fn run(state: &AppState, command: Commands, json: bool) -> Result<(), AppError> {
    match command {
        Commands::Login { username, password } => {
            let user = views::auth::login(state, &username, &password).await?;
            println!("Signed in as {}", user.username);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let message = views::auth::register(state, &username, &email, &password).await?;
            println!("{}", message);
        }
        Commands::Logout => {
            views::auth::logout(state).await?;
            println!("Signed out");
        }
        Commands::Whoami => match state.session.current_user().await {
            Some(user) if state.session.is_authenticated().await => {
                println!("{} ({:?})", user.username, user.scheme)
            }
            Some(user) => println!("{} (session expired)", user.username),
            None => println!("Not signed in"),
        },
        Commands::Home => {
            let home = views::home::load(state).await;
            println!("Top cars");
            for car in &home.top_cars {
                print_car(car);
            }
            println!("Offers");
            for offer in &home.offers {
                println!("  {}  {}", offer.code, offer.desc);
            }
            println!("Short-term rentals");
            for rental in &home.rentals {
                println!("  {}  {}", rental.title, rental.description);
            }
            println!("FAQs");
            for faq in &home.faqs {
                println!("  Q: {}\n  A: {}", faq.question, faq.answer);
            }
        }
        Commands::Locations { text } => {
            let lookup = LocationLookup::new(state);
            lookup.input(&text).await;
            lookup.settle().await;
            for location in lookup.suggestions().await {
                println!("{}", location.name);
            }
        }
        Commands::Search {
            trip,
            pickup,
            destination,
            drop,
            start_date,
            start_time,
            return_date,
            return_time,
            package,
            days,
            no_driver,
        } => {
            let trip_type: TripType = trip.parse().map_err(|e: carty_core::CoreError| {
                AppError::Inline(e.to_string())
            })?;
            let mut view = SearchView::new(state.clone());
            view.select_trip(trip_type);
            view.form.pickup = pickup;
            view.form.destination = destination;
            view.form.drop = drop;
            view.form.start_date = start_date;
            view.form.start_time = start_time;
            view.form.return_date = return_date;
            view.form.return_time = return_time;
            view.form.package = package;
            view.form.days = days;
            view.form.driver_required = !no_driver;
            let temp_id = view.submit().await?;
            println!("Temp booking {}", temp_id);
        }
        Commands::Cars { temp_id, filters } => {
            let view = ListingView::open(state.clone(), temp_id.map(TempBookingId::new), None).await;
            for filter in filters {
                let (field, value) = filter
                    .split_once('=')
                    .ok_or_else(|| AppError::Inline(format!("Expected field=value, got '{}'", filter)))?;
                view.update(field.trim(), value.trim()).await?;
            }
            view.settle().await;
            if let Some(error) = view.error().await {
                return Err(AppError::Inline(error));
            }
            let cars = view.cars().await;
            if json {
                return print_json(&cars);
            }
            for car in &cars {
                print_car(car);
            }
        }
        Commands::Quote {
            car_id,
            plan,
            coupon,
        } => {
            let mut view = DetailView::open(state.clone(), car_id, None, None, None).await?;
            if let Some(plan) = plan {
                view.select_plan(parse_plan(&plan)?);
            }
            if let Some(code) = coupon {
                view.apply_coupon(&code)?;
            }
            let quote = view.quote();
            if json {
                return print_json(&quote);
            }
            println!("{}", view.car().display_name());
            println!("  Base fare   {}", quote.base);
            println!("  Plan fee    {}", quote.plan_fee);
            println!("  Discount   -{}", quote.discount);
            println!("  Total       {}", quote.total);
        }
        Commands::Checkout {
            car_id,
            plan,
            coupon,
            temp_id,
            method,
            app,
            bank,
            card_number,
        } => {
            let mut detail = DetailView::open(
                state.clone(),
                car_id,
                temp_id.map(TempBookingId::new),
                None,
                None,
            )
            .await?;
            detail.select_plan(parse_plan(&plan)?);
            if let Some(code) = coupon {
                detail.apply_coupon(&code)?;
            }
            let draft = detail.book_now().await?;

            let mut view = ConfirmationView::open(state.clone(), draft).await;
            let trip = view.trip();
            if let Some(pickup) = &trip.pickup_location {
                println!("Pickup  {}", pickup);
            }
            if let Some(at) = &trip.pickup {
                println!("From    {}", at);
            }
            println!("Total   {}  (price held for {})", view.draft().total, view.clock());

            let method = PaymentMethod::from_wire(&method)
                .ok_or_else(|| AppError::Inline(format!("Unknown payment method '{}'", method)))?;
            view.choose_method(method);
            match method {
                PaymentMethod::Upi => {
                    if let Some(app) = app.as_deref().and_then(UpiApp::from_code) {
                        view.select_upi_app(app)?;
                    }
                }
                PaymentMethod::NetBanking => {
                    if let Some(bank) = bank.as_deref().and_then(Bank::from_code) {
                        view.select_bank(bank)?;
                    }
                }
                PaymentMethod::Card => {
                    if let (Some(card), Some(number)) = (view.card_mut(), card_number) {
                        card.number = number.as_str().into();
                    }
                }
            }
            let confirmed = view.pay().await?;
            if let Some(id) = confirmed.booking_id {
                println!("Booking #{}", id);
            }
        }
        Commands::Bookings => {
            let bookings = views::bookings::my_bookings(state).await?;
            if json {
                return print_json(&bookings);
            }
            for booking in bookings {
                println!(
                    "#{}  {}  {} → {}  {}  driver: {}",
                    booking.id,
                    booking.car_label(),
                    booking.start_date.as_deref().map(format_timestamp).unwrap_or_default(),
                    booking.end_date.as_deref().map(format_timestamp).unwrap_or_default(),
                    booking.status,
                    booking.driver_label(),
                );
            }
        }
        Commands::Book {
            car_id,
            start,
            end,
            driver,
        } => {
            let form = BookCarForm {
                car_id,
                start_date: start,
                end_date: end,
                driver_id: driver,
            };
            let booking = views::bookings::book_car(state, &form).await?;
            println!("Booking #{}", booking.id);
        }
        Commands::Pay { booking_id, method } => {
            let mut view = PaymentView::open(state.clone(), booking_id).await?;
            view.form.payment_method = method;
            let payment = view.submit().await?;
            println!("Paid {}", payment.amount);
        }
        Commands::Notifications => {
            let notifications = views::notifications::notifications(state).await?;
            if json {
                return print_json(&notifications);
            }
            for notification in notifications {
                let mark = if notification.is_read { " " } else { "*" };
                println!("{} {}", mark, notification.message);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_plan(raw: &str) -> Result<PlanTier, AppError> {
    raw.parse()
        .map_err(|e: carty_catalog::CatalogError| AppError::Inline(e.to_string()))
}

fn print_car(car: &Car) {
    println!(
        "  #{}  {}  {}  {}",
        car.id,
        car.display_name(),
        car.meta_line(),
        car.base_fare
    );
}
