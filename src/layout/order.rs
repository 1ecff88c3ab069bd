//! Dependency ordering of struct descriptions
//!
//! A struct that embeds another struct by value (directly or as an array
//! element) can only be resolved after it. Pointers never create an
//! ordering constraint. Aliases are followed to their target.

use super::LayoutError;
use crate::api::{AliasDesc, StructDesc};
use crate::ctype::parse_type;
use rustc_hash::FxHashMap;

/// Order `structs` so every described by-value dependency comes first.
///
/// Description order is kept wherever there is no constraint. References to
/// structs that are not described, and type strings that do not parse, are
/// left for the resolver to report.
pub fn dependency_order<'a>(
    structs: &'a [StructDesc],
    aliases: &[AliasDesc],
) -> Result<Vec<&'a StructDesc>, LayoutError> {
    let mut index_of: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, desc) in structs.iter().enumerate() {
        index_of.entry(desc.name.as_str()).or_insert(i);
    }

    let alias_target: FxHashMap<&str, &str> = aliases
        .iter()
        .map(|alias| (alias.name.as_str(), alias.type_name.as_str()))
        .collect();

    let mut dependencies: Vec<Vec<usize>> = Vec::with_capacity(structs.len());
    for (i, desc) in structs.iter().enumerate() {
        let mut deps = Vec::new();
        for field in &desc.fields {
            let Ok(ctype) = parse_type(&field.type_name) else {
                continue;
            };
            let Some(name) = ctype.struct_dependency() else {
                continue;
            };
            let name = follow_alias(name, &alias_target);
            if let Some(&dep) = index_of.get(name) {
                deps.push(dep);
            }
        }
        deps.sort_unstable();
        deps.dedup();
        dependencies.push(deps);
    }

    let mut emitted = vec![false; structs.len()];
    let mut ordered = Vec::with_capacity(structs.len());

    while ordered.len() < structs.len() {
        // lowest ready index first keeps description order stable
        let next = (0..structs.len())
            .find(|&i| !emitted[i] && dependencies[i].iter().all(|&dep| emitted[dep]));

        match next {
            Some(i) => {
                emitted[i] = true;
                ordered.push(&structs[i]);
            }
            None => {
                // stuck nodes either sit on a cycle or depend on one; only
                // the members of the first cycle are reported
                let stuck: Vec<usize> = (0..structs.len()).filter(|&i| !emitted[i]).collect();
                let names = stuck
                    .iter()
                    .find(|&&i| reaches(&dependencies, &emitted, i, i))
                    .map(|&start| {
                        stuck
                            .iter()
                            .filter(|&&j| {
                                reaches(&dependencies, &emitted, start, j)
                                    && reaches(&dependencies, &emitted, j, start)
                            })
                            .map(|&j| structs[j].name.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                return Err(LayoutError::Cycle { names });
            }
        }
    }

    Ok(ordered)
}

/// Whether `to` is reachable from `from` through at least one dependency
/// edge between structs that are not emitted yet.
fn reaches(dependencies: &[Vec<usize>], emitted: &[bool], from: usize, to: usize) -> bool {
    let mut seen = vec![false; dependencies.len()];
    let mut stack: Vec<usize> = dependencies[from].clone();
    while let Some(node) = stack.pop() {
        if emitted[node] || seen[node] {
            continue;
        }
        if node == to {
            return true;
        }
        seen[node] = true;
        stack.extend(dependencies[node].iter().copied());
    }
    false
}

/// Follow an alias chain to the struct it names. Stops on alias loops.
fn follow_alias<'a>(name: &'a str, alias_target: &FxHashMap<&'a str, &'a str>) -> &'a str {
    let mut current = name;
    for _ in 0..=alias_target.len() {
        match alias_target.get(current) {
            Some(&target) => current = target,
            None => break,
        }
    }
    current
}
