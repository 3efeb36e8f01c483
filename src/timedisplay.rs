use std::time::Duration;

pub fn pretty_print_duration(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = total / 3600 % 24;
    let minutes = total / 60 % 60;
    let seconds = total % 60;

    format!(
        "{d} days {h} hours {m} minutes {s} seconds",
        d = days,
        h = hours,
        m = minutes,
        s = seconds
    )
}
