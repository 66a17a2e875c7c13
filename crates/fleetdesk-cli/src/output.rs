//! Plain-text tables for the terminal.

use serde_json::Value;

use fleetdesk_core::console::CacheReportRow;
use fleetdesk_core::models::{
    Admin, Customer, MaintenanceLog, PaginationMeta, SocialLink, Statistics, SupportRequest,
    Vehicle, Workshop,
};
use fleetdesk_core::utils::{format_date, format_optional, truncate_string, yes_no};
use fleetdesk_core::{Listing, Source};

/// Column width for names
const NAME_WIDTH: usize = 28;

pub fn print_source<T>(resource: &str, listing: &Listing<T>) {
    let age = listing
        .stored_at
        .map(|at| format!(" (stored {})", at.format("%H:%M:%S")))
        .unwrap_or_default();
    match listing.source {
        Source::Network => eprintln!("[{}] fetched from server", resource),
        Source::Cache => eprintln!("[{}] served from cache{}", resource, age),
        Source::StaleFallback => eprintln!(
            "[{}] server unreachable, showing stale data{}",
            resource, age
        ),
    }
}

pub fn print_meta(meta: &PaginationMeta) {
    println!("-- {}", meta.summary());
}

pub fn print_reply(reply: &Value) {
    match reply.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => println!("{}", message),
        _ => println!("OK"),
    }
}

pub fn print_admins(admins: &[Admin]) {
    println!("{:<38} {:<NAME_WIDTH$} {:<32} ROLES", "ID", "NAME", "EMAIL");
    for admin in admins {
        println!(
            "{:<38} {:<NAME_WIDTH$} {:<32} {}",
            admin.id,
            truncate_string(&admin.full_name(), NAME_WIDTH),
            truncate_string(&admin.email, 32),
            admin.role_names()
        );
    }
}

pub fn print_vehicles(vehicles: &[Vehicle]) {
    println!(
        "{:<6} {:<NAME_WIDTH$} {:<12} {:>9} {:<20} SERVICES",
        "ID", "VEHICLE", "PLATE", "MILEAGE", "OWNER"
    );
    for vehicle in vehicles {
        println!(
            "{:<6} {:<NAME_WIDTH$} {:<12} {:>9} {:<20} {}",
            vehicle.id,
            truncate_string(&vehicle.display_name(), NAME_WIDTH),
            format_optional(&vehicle.plate_number, "-"),
            vehicle.mileage.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
            truncate_string(vehicle.owner_name(), 20),
            vehicle.services.len()
        );
    }
}

pub fn print_customers(customers: &[Customer]) {
    println!(
        "{:<38} {:<NAME_WIDTH$} {:<14} {:<8} {:<9} VEHICLES",
        "ID", "NAME", "PHONE", "GENDER", "VERIFIED"
    );
    for customer in customers {
        println!(
            "{:<38} {:<NAME_WIDTH$} {:<14} {:<8} {:<9} {}",
            customer.id,
            truncate_string(&customer.name, NAME_WIDTH),
            format_optional(&customer.phone_number, "-"),
            format_optional(&customer.gender, "-"),
            yes_no(customer.is_verified),
            customer.vehicle_count()
        );
    }
}

pub fn print_support_requests(requests: &[SupportRequest]) {
    println!(
        "{:<10} {:<NAME_WIDTH$} {:<14} {:<12} {:<13} FROM",
        "REQUEST", "SUBJECT", "TYPE", "STATUS", "CREATED"
    );
    for request in requests {
        println!(
            "{:<10} {:<NAME_WIDTH$} {:<14} {:<12} {:<13} {}",
            request.request_id,
            truncate_string(&request.subject, NAME_WIDTH),
            format_optional(&request.issue_type, "-"),
            format_optional(&request.status, "-"),
            request
                .date_created
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".into()),
            request.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-")
        );
    }
}

pub fn print_workshops(workshops: &[Workshop]) {
    println!(
        "{:<6} {:<NAME_WIDTH$} {:<14} {:<7} {:<6} {:<9} SERVICES",
        "ID", "NAME", "CITY", "ACTIVE", "RATING", "OPEN DAYS"
    );
    for workshop in workshops {
        println!(
            "{:<6} {:<NAME_WIDTH$} {:<14} {:<7} {:<6} {:<9} {}",
            workshop.id,
            truncate_string(&workshop.name, NAME_WIDTH),
            format_optional(&workshop.city, "-"),
            yes_no(workshop.is_active),
            workshop
                .rating()
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".into()),
            workshop.open_days(),
            workshop
                .services
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

pub fn print_social_links(links: &[SocialLink]) {
    println!("{:<6} {:<12} {:<7} URL", "ID", "TYPE", "ACTIVE");
    for link in links {
        println!(
            "{:<6} {:<12} {:<7} {}",
            link.id,
            link.kind,
            yes_no(link.is_active),
            link.url
        );
    }
}

pub fn print_statistics(statistics: &Statistics) {
    for (key, count) in statistics.counters() {
        println!("{:<32} {:>8}", key.replace('_', " "), count);
    }
}

pub fn print_maintenance_logs(logs: &[MaintenanceLog]) {
    println!(
        "{:<6} {:<13} {:<20} {:<NAME_WIDTH$} {:>10}",
        "ID", "DATE", "SERVICE", "VEHICLE", "COST"
    );
    for log in logs {
        println!(
            "{:<6} {:<13} {:<20} {:<NAME_WIDTH$} {:>10}",
            log.id,
            log.service_date
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".into()),
            truncate_string(&format_optional(&log.service_type, "-"), 20),
            truncate_string(&format_optional(&log.vehicle_name, "-"), NAME_WIDTH),
            format_optional(&log.cost, "-")
        );
    }
}

pub fn print_cache_report(rows: &[CacheReportRow]) {
    eprintln!("{:<18} {:<6} {:<10} ENTRIES", "CACHE", "STATE", "AGE");
    for row in rows {
        eprintln!(
            "{:<18} {:<6} {:<10} {}",
            row.resource,
            row.status.state_label(),
            row.status.age_display(),
            row.status.entries
        );
    }
}
