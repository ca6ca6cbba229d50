//! Include graph and folder tree construction.
//!
//! The include graph is indexed parallel to the Include dictionary. Only
//! direct edges are kept: a header reached through a chain of includes gets
//! one edge per hop, never a transitive closure.

use super::score::{CompileFolder, CompileIncluder, ScoreData};
use super::strings::crc64;
use crate::parser::category::CompileCategory;
use crate::parser::schema::CompileTrack;
use log::debug;

/// Record the direct include edges found in one unit's tracks
///
/// **Public** - called by the engine after Include ids are resolved
///
/// An include nested in another include is recorded against its parent
/// include; a top-level include is recorded against the unit itself.
pub fn record_includers(includers: &mut Vec<CompileIncluder>, unit_id: u32, tracks: &[CompileTrack]) {
    for track in tracks {
        // (end, include id) of the includes still open at the current event
        let mut open: Vec<(u32, u32)> = Vec::new();

        for event in &track.events {
            if event.category != CompileCategory::Include {
                continue;
            }

            while let Some(&(end, _)) = open.last() {
                if end <= event.start {
                    open.pop();
                } else {
                    break;
                }
            }

            let include_id = event.name_id;
            let slot = include_id as usize;
            if includers.len() <= slot {
                includers.resize_with(slot + 1, CompileIncluder::default);
            }

            match open.last() {
                Some(&(_, parent_id)) => {
                    includers[slot].includes.insert(parent_id);
                }
                None => {
                    includers[slot].units.insert(unit_id);
                }
            }

            open.push((event.end(), include_id));
        }
    }
}

// Leading component standing for the filesystem root of an absolute path
const ROOT_COMPONENT: &str = "/";

/// Split a path into its directory components, dropping the file name
///
/// Absolute paths start with [`ROOT_COMPONENT`].
fn directory_components(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = Vec::new();
    if path.starts_with(['/', '\\']) {
        components.push(ROOT_COMPONENT);
    }
    components.extend(path.split(['/', '\\']).filter(|component| !component.is_empty()));
    components.pop();
    components
}

/// Join directory components back into a `/` separated path
fn join_components(components: &[&str]) -> String {
    match components.split_first() {
        Some((&ROOT_COMPONENT, rest)) => format!("{}{}", ROOT_COMPONENT, rest.join("/")),
        _ => components.join("/"),
    }
}

/// Rebuild the folder tree from every unit and include path
///
/// **Public** - post-pass run once all units are folded
///
/// The root folder is named after the directory prefix shared by all paths;
/// below it one node exists per distinct directory name at each level.
pub fn build_folders(score: &mut ScoreData) {
    let unit_paths: Vec<(u32, String)> = score
        .units
        .iter()
        .map(|unit| (unit.unit_id, score.strings.resolve(unit.name_hash).to_string()))
        .collect();

    let include_paths: Vec<(u32, String)> = score
        .dictionary(CompileCategory::Include)
        .map(|dictionary| {
            dictionary
                .entries()
                .iter()
                .enumerate()
                .map(|(id, data)| (id as u32, score.strings.resolve(data.name_hash).to_string()))
                .collect()
        })
        .unwrap_or_default();

    let all_dirs: Vec<Vec<&str>> = unit_paths
        .iter()
        .chain(include_paths.iter())
        .map(|(_, path)| directory_components(path))
        .collect();

    let prefix_len = common_prefix_len(&all_dirs);
    let root_name = all_dirs
        .first()
        .map(|dirs| join_components(&dirs[..prefix_len]))
        .unwrap_or_default();

    let mut folders = vec![CompileFolder::new(root_name)];

    for (unit_id, path) in &unit_paths {
        let dirs = directory_components(path);
        let folder = walk_or_create(&mut folders, &dirs[prefix_len..]);
        folders[folder].unit_ids.push(*unit_id);
    }

    for (include_id, path) in &include_paths {
        let dirs = directory_components(path);
        let folder = walk_or_create(&mut folders, &dirs[prefix_len..]);
        folders[folder].include_ids.push(*include_id);
    }

    debug!("Built folder tree with {} nodes", folders.len());
    score.folders = folders;
}

fn common_prefix_len(paths: &[Vec<&str>]) -> usize {
    let Some(first) = paths.first() else {
        return 0;
    };

    let mut len = first.len();
    for path in &paths[1..] {
        len = len.min(
            first
                .iter()
                .zip(path.iter())
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    len
}

fn walk_or_create(folders: &mut Vec<CompileFolder>, components: &[&str]) -> usize {
    let mut current = 0usize;
    for component in components {
        let key = crc64(component.as_bytes());
        current = match folders[current].child_lookup.get(&key) {
            Some(&child) => child as usize,
            None => {
                let child = folders.len() as u32;
                folders.push(CompileFolder::new(*component));
                folders[current].children.push(child);
                folders[current].child_lookup.insert(key, child);
                child as usize
            }
        };
    }
    current
}
