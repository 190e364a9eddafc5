//! Stage physics inspector.
//!
//! Loads a JSON stage file, collects physics descriptors from the requested
//! subtrees and prints a per-type summary.
//!
//! Usage: cargo run -p scene-info -- <stage.json> [--include /World] [--exclude /World/Debug] [-v]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use physwalk_scene::physics::{
    load_physics_from_range, CustomPhysicsTokens, JointDrive, JointFamily, JointLimit, ObjectDesc,
    ObjectKind, ObjectType, ParseOptions,
};
use physwalk_scene::{ScenePath, Stage};

#[derive(Parser)]
#[command(name = "scene-info")]
#[command(about = "Summarize the physics objects found in a stage file")]
#[command(version)]
struct Cli {
    /// Stage file (.json)
    stage: PathBuf,

    /// Subtree roots to parse (defaults to the whole stage)
    #[arg(short, long = "include", value_name = "PATH")]
    include: Vec<ScenePath>,

    /// Prims to skip, together with their subtrees
    #[arg(short, long = "exclude", value_name = "PATH")]
    exclude: Vec<ScenePath>,

    /// Keep only objects owned by these physics scenes ("/" keeps unowned objects)
    #[arg(long = "owner", value_name = "PATH")]
    owners: Vec<ScenePath>,

    /// Custom joint type or API schema names
    #[arg(long = "custom-joint", value_name = "TOKEN")]
    custom_joints: Vec<String>,

    /// Custom shape type or API schema names
    #[arg(long = "custom-shape", value_name = "TOKEN")]
    custom_shapes: Vec<String>,

    /// Custom instancer type or API schema names; their subtrees are skipped
    #[arg(long = "custom-instancer", value_name = "TOKEN")]
    custom_instancers: Vec<String>,

    /// Print every descriptor
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Default)]
struct Report {
    groups: BTreeMap<ObjectType, Vec<ObjectDesc>>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let stage = Stage::load_from_file(&cli.stage)
        .with_context(|| format!("Failed to load {}", cli.stage.display()))?;

    let include = include_paths(&cli.include);

    let options = ParseOptions {
        exclude_paths: cli.exclude.clone(),
        custom_tokens: CustomPhysicsTokens {
            joint_tokens: cli.custom_joints.clone(),
            shape_tokens: cli.custom_shapes.clone(),
            instancer_tokens: cli.custom_instancers.clone(),
        },
        simulation_owners: (!cli.owners.is_empty()).then(|| cli.owners.clone()),
    };

    let mut report = Report::default();
    let summary = load_physics_from_range(
        &stage,
        &include,
        |object_type, _: &[ScenePath], descs: &[ObjectDesc], stage: &Stage| {
            log::debug!("{}: {} of {} prims", object_type, descs.len(), stage.len() - 1);
            report.groups.insert(object_type, descs.to_vec());
        },
        &stage,
        &options,
    )
    .context("Failed to parse physics")?;

    println!("Stage: {}", cli.stage.display());
    println!("Prims: {}", stage.len() - 1);
    println!("Visited: {}", summary.visited);
    println!();

    print_summary(&report);

    if cli.verbose {
        println!();
        print_details(&report);
    }

    Ok(())
}

/// Include paths to parse; the stage root when none are given, so an empty
/// stage still parses.
fn include_paths(include: &[ScenePath]) -> Vec<ScenePath> {
    if include.is_empty() {
        vec![ScenePath::root()]
    } else {
        include.to_vec()
    }
}

fn print_summary(report: &Report) {
    println!("Physics Objects:");
    println!("  {:<20} {:>8} {:>8}", "Type", "Count", "Invalid");
    println!("  {}", "-".repeat(38));

    let mut total = 0;
    for (object_type, descs) in &report.groups {
        let invalid = descs.iter().filter(|desc| !desc.is_valid).count();
        println!("  {:<20} {:>8} {:>8}", object_type.name(), descs.len(), invalid);
        total += descs.len();
    }

    println!("  {}", "-".repeat(38));
    println!("  {:<20} {:>8}", "Total", total);
}

fn print_details(report: &Report) {
    for (object_type, descs) in &report.groups {
        println!("{}:", object_type);
        for desc in descs {
            let marker = if desc.is_valid { "" } else { " (invalid)" };
            println!("  {}{}", desc.prim_path, marker);
            for line in describe(desc) {
                println!("    {}", line);
            }
        }
    }
}

fn join(paths: &[ScenePath]) -> String {
    paths.iter().map(ScenePath::as_str).collect::<Vec<_>>().join(", ")
}

fn describe_limit(name: &str, limit: &JointLimit) -> Option<String> {
    limit
        .enabled
        .then(|| format!("{} limit: [{}, {}]", name, limit.lower, limit.upper))
}

fn describe_drive(name: &str, drive: &JointDrive) -> Option<String> {
    drive.enabled.then(|| {
        format!(
            "{} drive: target {}/{}, stiffness {}, damping {}{}",
            name,
            drive.target_position,
            drive.target_velocity,
            drive.stiffness,
            drive.damping,
            if drive.acceleration { " (acceleration)" } else { "" }
        )
    })
}

fn describe_joint_family(family: &JointFamily) -> Vec<String> {
    match family {
        JointFamily::Revolute { limit, drive, .. } => {
            [describe_limit("angular", limit), describe_drive("angular", drive)]
                .into_iter()
                .flatten()
                .collect()
        }
        JointFamily::Prismatic { limit, drive, .. } => {
            [describe_limit("linear", limit), describe_drive("linear", drive)]
                .into_iter()
                .flatten()
                .collect()
        }
        JointFamily::Spherical { limit, .. } => describe_limit("cone", limit).into_iter().collect(),
        JointFamily::Distance { limit, .. } => {
            describe_limit("distance", limit).into_iter().collect()
        }
        JointFamily::D6 { limits, drives } => limits
            .iter()
            .filter_map(|(dof, limit)| describe_limit(dof.token(), limit))
            .chain(drives.iter().filter_map(|(dof, drive)| describe_drive(dof.token(), drive)))
            .collect(),
        JointFamily::Custom { token } => vec![format!("custom: {}", token)],
        JointFamily::Fixed => Vec::new(),
    }
}

fn describe(desc: &ObjectDesc) -> Vec<String> {
    let mut lines = Vec::new();
    match &desc.kind {
        ObjectKind::Scene(scene) => {
            lines.push(format!("gravity: {:?} x {}", scene.gravity_direction, scene.gravity_magnitude));
        }
        ObjectKind::RigidBody(body) => {
            lines.push(format!(
                "enabled: {}, kinematic: {}, asleep: {}",
                body.rigid_body_enabled, body.kinematic_body, body.starts_asleep
            ));
            lines.push(format!(
                "position: {:?}, velocity: {:?}",
                body.position, body.linear_velocity
            ));
            if !body.collisions.is_empty() {
                lines.push(format!("collisions: {}", join(&body.collisions)));
            }
        }
        ObjectKind::Shape(shape) => {
            lines.push(format!("geometry: {:?}", shape.geometry));
            if let Some(body) = &shape.rigid_body {
                lines.push(format!("body: {}", body));
            }
            lines.push(format!("local position: {:?}", shape.local_pos));
            if !shape.collision_groups.is_empty() {
                lines.push(format!("groups: {}", join(&shape.collision_groups)));
            }
        }
        ObjectKind::Joint(joint) => {
            let body = |path: &Option<ScenePath>| {
                path.as_ref().map_or_else(|| "<world>".to_string(), ScenePath::to_string)
            };
            lines.push(format!("bodies: {} -> {}", body(&joint.body0), body(&joint.body1)));
            if let Some(axis) = joint.family.axis() {
                lines.push(format!("axis: {:?}", axis));
            }
            lines.extend(describe_joint_family(&joint.family));
        }
        ObjectKind::RigidBodyMaterial(material) => {
            lines.push(format!(
                "friction: {}/{}, restitution: {}, density: {}",
                material.static_friction,
                material.dynamic_friction,
                material.restitution,
                material.density
            ));
        }
        ObjectKind::Articulation(articulation) => {
            lines.push(format!("roots: {}", join(&articulation.root_prims)));
        }
        ObjectKind::CollisionGroup(group) => {
            if !group.includes.is_empty() {
                lines.push(format!("includes: {}", join(&group.includes)));
            }
        }
    }
    lines
}
