use chrono::{DateTime, Utc};
use shepherd_core::{friendly_phase, BackupObject, HasMeta, Phase, Resource, Sync};

/// Age of an RFC3339 timestamp relative to `now`, kubectl style.
pub fn render_age(creation_ts: &str, now: DateTime<Utc>) -> String {
    let Ok(created) = DateTime::parse_from_rfc3339(creation_ts) else {
        return "-".to_string();
    };
    let mut secs = (now - created.with_timezone(&Utc)).num_seconds().max(0) as u64;
    let days = secs / 86_400; secs %= 86_400;
    let hours = secs / 3600; secs %= 3600;
    let mins = secs / 60; secs %= 60;
    if days > 0 { format!("{}d{}h", days, hours) }
    else if hours > 0 { format!("{}h{}m", hours, mins) }
    else if mins > 0 { format!("{}m", mins) }
    else { format!("{}s", secs) }
}

fn phase_col(phase: Option<&Phase>) -> String {
    phase.map(|p| friendly_phase(p.as_str())).filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string())
}

pub const BACKUP_HEADER: &str = "NAME                           FRIENDLY NAME             PHASE              AGE";

pub fn backup_row<B: BackupObject>(b: &B, now: DateTime<Utc>) -> String {
    format!(
        "{:<30} {:<25} {:<18} {}",
        b.name(),
        b.friendly_name(),
        phase_col(b.phase()),
        render_age(b.creation_timestamp(), now)
    )
}

pub const SYNC_HEADER: &str = "NAME                           SITE     FROM       TO         BACKUP         RESTORE        AGE";

pub fn sync_row(s: &Sync, now: DateTime<Utc>) -> String {
    format!(
        "{:<30} {:<8} {:<10} {:<10} {:<14} {:<14} {}",
        s.name(),
        s.site,
        s.backup_env,
        s.restore_env,
        phase_col(s.backup_phase.as_ref()),
        phase_col(s.restore_phase.as_ref()),
        render_age(s.creation_timestamp(), now)
    )
}

/// One-line human summary of any decoded resource.
pub fn summary(r: &Resource, now: DateTime<Utc>) -> String {
    let kind = r.kind();
    match r {
        Resource::Backup(b) => format!("{kind} {}", backup_row(b, now)),
        Resource::Restore(x) => format!("{kind} {} from {}", backup_row(x, now), x.backup_name),
        Resource::ScheduledBackup(s) => {
            format!("{kind} {} schedule={:?} retention={}", backup_row(s, now), s.schedule, s.retention)
        }
        Resource::Sync(s) => format!("{kind} {}", sync_row(s, now)),
        Resource::BackupList(l) => format!("{kind} ({} items)", l.len()),
        Resource::RestoreList(l) => format!("{kind} ({} items)", l.len()),
        Resource::SyncList(l) => format!("{kind} ({} items)", l.len()),
        Resource::ConfigMap(c) => format!("{kind} {} ({} keys)", c.name(), c.data.len()),
        Resource::Route(rt) => format!("{kind} {} {}{} -> {}/{}", rt.name(), rt.host, rt.path, rt.to_kind, rt.to_name),
        Resource::NetworkPolicy(np) => format!("{kind} {} port={}", np.name(), np.port),
        Resource::Hpa(h) => format!("{kind} {} {}..{} cpu={}%", h.name(), h.min_replicas, h.max_replicas, h.target_cpu),
        Resource::StatefulSet(s) => format!("{kind} {} replicas={}", s.name(), s.replicas),
    }
}
