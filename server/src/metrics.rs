use std::{
    collections::BTreeMap,
    fmt::Write as _,
    sync::{Arc, Mutex, PoisonError},
};

use crate::version::Element;

const BUMPS_NAME: &str = "vbump_bumps_total";
const BUMPS_HELP: &str =
    "Number of bumps tracked by vbump, labelled with projectname and semVer element";

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Receives one call per persisted bump.
pub trait BumpCounter: Send + Sync {
    fn record_bump(&self, project: &str, element: Element);
}

impl<T: BumpCounter + ?Sized> BumpCounter for Arc<T> {
    fn record_bump(&self, project: &str, element: Element) {
        (**self).record_bump(project, element);
    }
}

/// Counts bumps per project and element and renders them in the Prometheus text format.
#[derive(Default)]
pub struct BumpMetrics {
    bumps: Mutex<BTreeMap<(String, Element), u64>>,
}

impl BumpMetrics {
    pub fn count(&self, project: &str, element: Element) -> u64 {
        self.bumps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(project.to_string(), element))
            .copied()
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let bumps = self.bumps.lock().unwrap_or_else(PoisonError::into_inner);

        let mut output = String::new();
        let _ = writeln!(output, "# HELP {BUMPS_NAME} {BUMPS_HELP}");
        let _ = writeln!(output, "# TYPE {BUMPS_NAME} counter");
        for ((project, element), count) in bumps.iter() {
            let _ = writeln!(
                output,
                "{BUMPS_NAME}{{element=\"{element}\",project=\"{}\"}} {count}",
                escape_label(project)
            );
        }
        output
    }
}

impl BumpCounter for BumpMetrics {
    fn record_bump(&self, project: &str, element: Element) {
        *self
            .bumps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((project.to_string(), element))
            .or_default() += 1;
    }
}

fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(character),
        }
    }
    escaped
}
