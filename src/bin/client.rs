use std::future::Future;
use std::io::{self, Write};

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};

use tripbook::badge::Badge;
use tripbook::booking_flow::BookingFlow;
use tripbook::bookings::{BookingsView, StatusFilter};
use tripbook::cancel::{cancellable, CancelScope};
use tripbook::config::Config;
use tripbook::context::AppContext;
use tripbook::error::{ApiError, FlowError};
use tripbook::flight_models::{BookingDetail, BookingSummary, Flight, SeatPreference, UpdateBookingRequest};
use tripbook::format::{format_date, format_duration, format_price, format_time};
use tripbook::logging;
use tripbook::search::{filter_cities, SearchForm};

const SEPARATOR: &str = "----------------------------------";

/// 读取一行输入
fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{label} [y/N]: "))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Runs `fut`; Ctrl-C cancels the scope it was started under.
async fn interruptible<F: Future>(scope: &CancelScope, fut: F) -> F::Output {
    tokio::pin!(fut);
    tokio::select! {
        output = &mut fut => output,
        _ = tokio::signal::ctrl_c() => {
            scope.cancel();
            fut.await
        }
    }
}

fn show_error(err: &ApiError) {
    println!("! {}", err.user_message());
}

fn flight_card(ctx: &AppContext, flight: &Flight) -> String {
    let seats = if flight.is_sold_out() {
        "sold out".to_string()
    } else {
        format!("{} seats left", flight.available_seats)
    };
    format!(
        "{}  {}\n    {} {} --{}--> {} {}\n    {} / seat, {}",
        flight.flight_code,
        flight.airline_name,
        flight.origin_city,
        format_time(flight.departure_datetime),
        format_duration(flight.departure_datetime, flight.arrival_datetime),
        flight.destination_city,
        format_time(flight.arrival_datetime),
        format_price(flight.price, ctx.currency()),
        seats,
    )
}

fn booking_card(ctx: &AppContext, booking: &BookingSummary) -> String {
    let date = booking
        .booking_date
        .map(|d| format_date(d.date_naive()))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} {} -> {}  {}  {}\n    id: {}",
        Badge::for_status(&booking.status).render(),
        booking.flight_code,
        booking.origin_city,
        booking.destination_city,
        format_price(booking.total_price, ctx.currency()),
        date,
        booking.booking_id,
    )
}

fn booking_detail(ctx: &AppContext, detail: &BookingDetail) -> String {
    let mut out = format!(
        "Booking {}\nStatus: {}\n{}\nTickets: {}\nTotal: {}",
        detail.booking_id,
        Badge::for_status(&detail.status).render(),
        flight_card(ctx, &detail.flight_details),
        detail.num_tickets,
        format_price(detail.total_price, ctx.currency()),
    );
    if let Some(created) = detail.created_at {
        out.push_str(&format!("\nCreated: {}", format_date(created.date_naive())));
    }
    if detail.passenger_details.is_empty() {
        out.push_str("\nPassengers: not provided");
    }
    for (i, passenger) in detail.passenger_details.iter().enumerate() {
        let seat = passenger.seat_preference.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("\n  {}. {} ({seat})", i + 1, passenger.name));
    }
    out
}

/// 首页: 问候和最近的预订
async fn home_screen(ctx: &AppContext) -> anyhow::Result<()> {
    let Some(user) = ctx.session.user() else {
        println!("Not signed in. Use 5 to sign in.");
        return Ok(());
    };
    println!("Hello, {} ({})", user.first_name, user.initials());

    let scope = CancelScope::new();
    match interruptible(&scope, BookingsView::load(&ctx.api, &user.email, &scope.handle())).await {
        Ok(view) if view.all().is_empty() => println!("No recent bookings"),
        Ok(view) => {
            println!("Recent bookings:");
            for booking in view.recent(3) {
                println!("{}", booking_card(ctx, booking));
            }
        }
        Err(ApiError::Cancelled) => {}
        Err(err) => show_error(&err),
    }
    Ok(())
}

/// 搜索航班, 可选择一个航班继续预订
async fn search_screen(ctx: &AppContext) -> anyhow::Result<()> {
    let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
    let mut form = SearchForm::new(tomorrow);

    let cities: Vec<_> = filter_cities(&prompt("Filter cities (enter to list all): ")?)
        .iter()
        .map(|c| format!("{} ({})", c.code, c.name))
        .collect();
    println!("Cities: {}", cities.join(", "));

    form.origin = prompt("Enter origin: ")?;
    form.destination = prompt("Enter destination: ")?;
    let date = prompt(&format!("Enter date YYYY-MM-DD [{}]: ", form.departure_date))?;
    if !date.is_empty() {
        match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(date) => form.departure_date = date,
            Err(_) => {
                println!("! Invalid date {date:?}");
                return Ok(());
            }
        }
    }
    let passengers = prompt("Enter passengers (1-9) [1]: ")?;
    if !passengers.is_empty() {
        form.num_passengers = passengers.parse().unwrap_or(0);
    }

    let params = match form.submit() {
        Ok(params) => params,
        Err(errors) => {
            for err in errors {
                println!("! {err}");
            }
            return Ok(());
        }
    };

    loop {
        println!("Searching {} -> {} on {}...", params.origin_city, params.destination_city, format_date(params.departure_date));
        let scope = CancelScope::new();
        let result = interruptible(&scope, cancellable(&scope.handle(), ctx.api.search_flights(&params))).await;

        let flights = match result {
            Ok(flights) => flights,
            Err(ApiError::Cancelled) => return Ok(()),
            Err(err) => {
                show_error(&err);
                if confirm("Try again?")? {
                    continue;
                }
                return Ok(());
            }
        };

        if flights.is_empty() {
            println!("No flights found. Try different dates or cities.");
            return Ok(());
        }
        for (i, flight) in flights.iter().enumerate() {
            println!("{}) {}", i + 1, flight_card(ctx, flight));
        }

        let choice = prompt("Select flight number to book (enter to go back): ")?;
        let Some(flight) = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| flights.get(i))
        else {
            return Ok(());
        };
        return booking_screen(ctx, flight.clone(), params.num_passengers).await;
    }
}

/// 预订流程: 乘客数量 -> 乘客信息 -> 提交
async fn booking_screen(ctx: &AppContext, flight: Flight, passengers: u32) -> anyhow::Result<()> {
    let Some(email) = ctx.session.email() else {
        println!("! Please sign in first.");
        return Ok(());
    };

    let scope = CancelScope::new();
    let mut flow = BookingFlow::new(ctx.service_fee());
    loop {
        let started = interruptible(&scope, flow.start(&ctx.api, email, flight.clone(), passengers, &scope.handle())).await;
        match started {
            Ok(()) => break,
            Err(FlowError::PendingPayment { booking_id }) => {
                println!("! You have a booking awaiting payment ({booking_id}). Complete or let it expire before booking again.");
                return Ok(());
            }
            Err(FlowError::SoldOut) => {
                println!("! This flight is sold out.");
                return Ok(());
            }
            Err(FlowError::Api(ApiError::Cancelled)) => return Ok(()),
            Err(err) => {
                println!("! {err}");
                if !(confirm("Try again?")? && flow.retry().is_ok()) {
                    return Ok(());
                }
            }
        }
    }

    println!("{}", flight_card(ctx, &flight));
    let count = prompt(&format!("Passengers (1-{}) [{}]: ", flow.max_passengers(), flow.num_passengers()))?;
    if let Ok(count) = count.parse() {
        flow.set_passenger_count(count);
    }

    loop {
        for i in 0..flow.passengers().len() {
            let current = flow.passengers()[i].clone();
            let name = prompt(&format!("Passenger {} name [{}]: ", i + 1, current.name))?;
            if !name.is_empty() {
                flow.set_passenger_name(i, name);
            }
            let seat = prompt("Seat preference (Window/Middle/Aisle, enter to skip): ")?;
            if !seat.is_empty() {
                flow.set_seat_preference(i, SeatPreference::parse(&seat));
            }
        }
        match flow.validate() {
            Ok(()) => break,
            Err(errors) => {
                for err in errors {
                    println!("! {err}");
                }
            }
        }
    }

    if let Some(preview) = flow.price_preview() {
        println!(
            "Price: {} x {} = {}\nService fee: {}\nEstimated total: {} (final amount is set by the airline)",
            format_price(preview.price_per_seat, ctx.currency()),
            preview.passengers,
            format_price(preview.subtotal, ctx.currency()),
            format_price(preview.service_fee, ctx.currency()),
            format_price(preview.total, ctx.currency()),
        );
    }
    if !confirm("Confirm booking?")? {
        return Ok(());
    }

    loop {
        let submitted = interruptible(&scope, flow.submit(&ctx.api, email, &scope.handle())).await;
        match submitted {
            Ok(confirmation) => {
                println!(
                    "Booking {} created: {} for {}",
                    confirmation.booking_id,
                    Badge::for_status(&confirmation.status).render(),
                    format_price(confirmation.total_price, ctx.currency()),
                );
                if let Some(due) = confirmation.payment_due {
                    println!("Pay before {} {} UTC", format_date(due.date_naive()), format_time(due));
                }
                return bookings_screen(ctx).await;
            }
            Err(FlowError::Api(ApiError::Cancelled)) => {
                println!("Stopped waiting for the booking. Check My bookings before booking again.");
                return Ok(());
            }
            Err(FlowError::Api(err)) => {
                show_error(&err);
                if confirm("Try again?")? && flow.retry().is_ok() {
                    continue;
                }
                return Ok(());
            }
            Err(err) => {
                println!("! {err}");
                return Ok(());
            }
        }
    }
}

/// 我的预订, 按状态过滤
async fn bookings_screen(ctx: &AppContext) -> anyhow::Result<()> {
    let Some(email) = ctx.session.email() else {
        println!("! Please sign in first.");
        return Ok(());
    };

    let mut view = loop {
        let scope = CancelScope::new();
        match interruptible(&scope, BookingsView::load(&ctx.api, email, &scope.handle())).await {
            Ok(view) => break view,
            Err(ApiError::Cancelled) => return Ok(()),
            Err(err) => {
                show_error(&err);
                if !confirm("Try again?")? {
                    return Ok(());
                }
            }
        }
    };

    loop {
        println!("{SEPARATOR}");
        let tabs: Vec<_> = StatusFilter::TABS
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let marker = if *tab == view.filter() { "*" } else { "" };
                format!("{}:{}{}", i + 1, tab.label(), marker)
            })
            .collect();
        println!("Filter: {}", tabs.join("  "));

        match view.empty_message() {
            Some(message) => println!("{message}"),
            None => {
                for booking in view.visible() {
                    println!("{}", booking_card(ctx, booking));
                }
            }
        }

        let choice = prompt("Filter number, or booking id for details (enter to go back): ")?;
        if choice.is_empty() {
            return Ok(());
        }
        match choice.parse::<usize>().ok().and_then(|n| StatusFilter::TABS.get(n.wrapping_sub(1))) {
            Some(tab) => view.set_filter(*tab),
            None => detail_screen(ctx, &choice).await?,
        }
    }
}

async fn detail_screen(ctx: &AppContext, booking_id: &str) -> anyhow::Result<()> {
    loop {
        let scope = CancelScope::new();
        let result = interruptible(&scope, cancellable(&scope.handle(), ctx.api.get_booking_by_id(booking_id))).await;
        match result {
            Ok(detail) => {
                println!("{}", booking_detail(ctx, &detail));
                return Ok(());
            }
            Err(ApiError::Cancelled) => return Ok(()),
            Err(err) if err.is_not_found() => {
                println!("! Booking {booking_id} not found");
                return Ok(());
            }
            Err(err) => {
                show_error(&err);
                if !confirm("Try again?")? {
                    return Ok(());
                }
            }
        }
    }
}

async fn manage_screen(ctx: &AppContext) -> anyhow::Result<()> {
    let booking_id = prompt("Enter booking id: ")?;
    if booking_id.is_empty() {
        return Ok(());
    }
    println!("1 - change passengers");
    println!("2 - cancel booking");
    let action = prompt("Enter action: ")?;
    let result = match action.as_str() {
        "1" => {
            let count = prompt("New number of tickets: ")?;
            let update = UpdateBookingRequest {
                num_tickets: count.parse().ok(),
                ..Default::default()
            };
            ctx.api.update_booking(&booking_id, &update).await.map(|_| ())
        }
        "2" => {
            if !confirm("Are you sure you want to cancel this booking?")? {
                return Ok(());
            }
            ctx.api.cancel_booking(&booking_id).await
        }
        _ => return Ok(()),
    };
    if let Err(err) = result {
        show_error(&err);
    }
    Ok(())
}

fn profile_screen(ctx: &mut AppContext) -> anyhow::Result<()> {
    match ctx.session.user() {
        Some(user) => {
            println!("{} ({})", user.full_name(), user.initials());
            println!("{}", user.email);
            println!("API: {}", ctx.api.base_url());
            if confirm("Sign out?")? {
                ctx.session.logout();
            }
        }
        None => {
            let email = prompt("Email: ")?;
            let password = prompt("Password: ")?;
            match ctx.session.login(&email, &password) {
                Ok(user) => println!("Welcome, {}", user.first_name),
                Err(err) => println!("! {err}"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置并初始化上下文
    let config = Config::load().context("failed to load config")?;
    let _log_guard = logging::init(&config.logging, "client");
    config.log_source();
    let mut ctx = AppContext::new(config).context("failed to create API client")?;

    println!("API base url: {}", ctx.api.base_url());
    home_screen(&ctx).await?;

    // 主循环, 处理用户输入
    loop {
        println!("{SEPARATOR}");
        println!("Command List:");
        println!("  quit - exit the program");
        println!("  0 - home");
        println!("  1 - search flights");
        println!("  2 - my bookings");
        println!("  3 - booking details");
        println!("  4 - manage booking");
        println!("  5 - profile");
        let command = prompt("Enter command: ")?;

        match command.as_str() {
            "quit" => break,
            "0" => home_screen(&ctx).await?,
            "1" => search_screen(&ctx).await?,
            "2" => bookings_screen(&ctx).await?,
            "3" => {
                let booking_id = prompt("Enter booking id: ")?;
                if !booking_id.is_empty() {
                    detail_screen(&ctx, &booking_id).await?;
                }
            }
            "4" => manage_screen(&ctx).await?,
            "5" => profile_screen(&mut ctx)?,
            _ => println!("Unknown command"),
        }
    }

    Ok(())
}
