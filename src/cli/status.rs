use tabled::Table;

use crate::{
    api::status::check_upstreams,
    config::Config,
    info,
    server::AppState,
    success,
    types::{ProbeState, StatusTableRow, UpstreamStatus},
    warning,
};

/// Probes every upstream once with the current configuration and prints the
/// result as a table.
pub async fn status(config: Config) {
    let state = AppState::new(config);

    info!("Checking upstream services...");
    let status = check_upstreams(&state).await;

    let table = Table::new(status_rows(&state, &status));
    println!("{}", table);

    let all_ok = status.spotify == ProbeState::Ok
        && status.youtube == ProbeState::Ok
        && status.instagram;
    if all_ok {
        success!("All upstream services are reachable");
    } else {
        warning!("Some upstream services are unavailable or not configured");
    }
}

fn status_rows(state: &AppState, status: &UpstreamStatus) -> Vec<StatusTableRow> {
    let yes_no = |b: bool| String::from(if b { "yes" } else { "no" });

    vec![
        StatusTableRow {
            provider: "Spotify".to_string(),
            configured: yes_no(state.spotify.is_configured()),
            status: probe_label(status.spotify),
        },
        StatusTableRow {
            provider: "YouTube".to_string(),
            configured: yes_no(state.youtube.is_configured()),
            status: probe_label(status.youtube),
        },
        StatusTableRow {
            provider: "Instagram".to_string(),
            configured: yes_no(state.instagram.is_configured()),
            status: if status.instagram {
                "authenticated".to_string()
            } else {
                "no valid token".to_string()
            },
        },
    ]
}

fn probe_label(state: ProbeState) -> String {
    let label = match state {
        ProbeState::Ok => "ok",
        ProbeState::Unavailable => "unavailable",
        ProbeState::Unconfigured => "unconfigured",
    };
    label.to_string()
}
