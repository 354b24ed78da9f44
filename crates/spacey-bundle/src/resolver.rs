// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dependency closure.

use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::error::Result;
use crate::provider::Provider;

/// Compute the set of `roots` plus everything they transitively require.
///
/// Each name is looked up once. The first provider error aborts the whole
/// resolution, including NotFound for a required name. Cycles terminate
/// because visited names are never queued again.
pub fn resolve<S: AsRef<str>>(roots: &[S], provider: &dyn Provider) -> Result<HashSet<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = roots.iter().map(|r| r.as_ref().to_string()).collect();

    while let Some(name) = queue.pop_front() {
        if seen.contains(&name) {
            continue;
        }
        seen.insert(name.clone());

        let module = provider.module(&name)?;
        for dep in module.require()? {
            if !seen.contains(&dep) {
                queue.push_back(dep);
            }
        }
    }

    debug!("Resolved {} roots to {} modules", roots.len(), seen.len());
    Ok(seen)
}
