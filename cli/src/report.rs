use milktally_core::{leading_blank_days, MonthEntries, MonthKey, MonthTotals, Settings};
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    weekday: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn show_settings(settings: &Settings, first_load: bool) {
    let rows = vec![
        SettingRow { name: "unit", value: settings.unit.clone() },
        SettingRow { name: "defaultVolume", value: settings.default_volume.to_string() },
        SettingRow { name: "costPerVolume", value: settings.cost_per_volume.to_string() },
        SettingRow { name: "currency", value: settings.currency.clone() },
        SettingRow { name: "currencySymbol", value: settings.currency_symbol.clone() },
        SettingRow { name: "weekdayStart", value: settings.weekday_start.to_string() },
        SettingRow { name: "applyTo", value: settings.apply_to.to_string() },
    ];

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);

    if first_load {
        println!("Settings have not been saved yet; these are the built-in defaults.");
    }
}

pub fn show_month(month: MonthKey, entries: &MonthEntries, settings: &Settings) {
    let symbol = &settings.currency_symbol;
    let rows: Vec<DayRow> = entries
        .iter()
        .filter_map(|(day, entry)| {
            let date = month.date(*day)?;
            Some(DayRow {
                date: date.format("%Y-%m-%d").to_string(),
                weekday: date.format("%a").to_string(),
                volume: format!("{} {}", entry.volume, settings.unit),
                price: format!("{}{:.2}", symbol, entry.cost),
                cost: format!("{}{:.2}", symbol, entry.total()),
            })
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

/// Week rows starting on the configured weekday, one cell per day.
pub fn show_grid(month: MonthKey, entries: &MonthEntries, settings: &Settings) {
    let mut builder = Builder::default();

    let first = settings.weekday_start.first_weekday();
    let header: Vec<String> = std::iter::successors(Some(first), |d| Some(d.succ()))
        .take(7)
        .map(|d| d.to_string())
        .collect();
    builder.push_record(header);

    let blanks = leading_blank_days(month, settings.weekday_start) as usize;
    let mut week: Vec<String> = vec![String::new(); blanks];
    for day in 1..=month.days() {
        let cell = match entries.get(&day) {
            Some(entry) => format!("{}\n{} {}", day, entry.volume, settings.unit),
            None => format!("{}\n-", day),
        };
        week.push(cell);
        if week.len() == 7 {
            builder.push_record(std::mem::take(&mut week));
        }
    }
    if !week.is_empty() {
        week.resize(7, String::new());
        builder.push_record(week);
    }

    let mut table = builder.build();
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{} {}", month_name(month), month.year());
    println!("{}", table);
}

pub fn show_totals(month: MonthKey, totals: &MonthTotals, settings: &Settings) {
    println!(
        "\x1b[1;36m{}\x1b[0m  Total Volume: {} {}  Total Cost: {}{:.2}",
        month, totals.total_volume, settings.unit, settings.currency_symbol, totals.total_cost
    );
}

pub fn show_months(months: &[MonthKey], current: MonthKey) {
    for month in months {
        let marker = if *month == current { "*" } else { " " };
        println!("{} {}  {} {}", marker, month, month_name(*month), month.year());
    }
}

fn month_name(month: MonthKey) -> String {
    month.first_day().format("%B").to_string()
}
