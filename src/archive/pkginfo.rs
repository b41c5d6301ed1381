use crate::archive::model::ArchiveRecord;
use std::str::FromStr;
use tracing::{debug, warn};

/// Apply the `key = value` lines of a `.PKGINFO` file to `record`.
///
/// Repeatable keys (`depend`, `license`, ...) accumulate in file order.
/// Unknown keys are ignored; numeric fields that fail to parse are logged
/// and stay at zero.
pub fn apply_pkginfo(record: &mut ArchiveRecord, content: &str) {
    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            debug!(line, "Ignoring malformed .PKGINFO line");
            continue;
        };
        let key = key.trim();
        let value = value.trim().to_string();

        match key {
            "pkgname" => record.name = Some(value),
            "pkgbase" => record.base = Some(value),
            "pkgver" => record.version = value,
            "pkgdesc" => record.description = value,
            "url" => record.url = value,
            "builddate" => record.build_date = parse_number(key, &value),
            "packager" => record.packager = value,
            "size" => record.installed_size = parse_number(key, &value),
            "arch" => record.architecture = value,
            "license" => record.licenses.push(value),
            "group" => record.groups.push(value),
            "provides" => record.provides.push(value),
            "depend" => record.depends.push(value),
            "optdepend" => record.optdepends.push(value),
            "conflict" => record.conflicts.push(value),
            "replaces" => record.replaces.push(value),
            "backup" => record.backup.push(value),
            _ => {}
        }
    }
}

fn parse_number<T: FromStr + Default>(key: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        warn!(key, value, "Invalid number in .PKGINFO, using 0");
        T::default()
    })
}
