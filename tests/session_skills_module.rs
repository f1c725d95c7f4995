use burrow::config::Settings;
use burrow::files::FileOpError;
use burrow::session::Workspace;
use burrow::shared::{OwnerId, ThreadId};
use burrow::vfs::VfsError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn settings(root: &Path) -> Settings {
    serde_yaml::from_str(&format!(
        r#"
workspaces_path: {root}/workspaces
skills_path: {root}/skills
tickets_path: {root}/tickets
readiness:
  max_attempts: 2
  poll_interval_ms: 1
"#,
        root = root.display()
    ))
    .expect("parse settings")
}

fn seed_skill(root: &Path, category: &str, name: &str) {
    let dir = root.join("skills").join(category).join(name);
    fs::create_dir_all(dir.join("resources")).expect("mkdir");
    fs::write(
        dir.join("SKILL.md"),
        format!(
            "---\nname: {name}\ndescription: test skill\ncategory: {category}\nversion: \"1.0.0\"\n---\n\n# {name}\n\nInstrucciones.\n"
        ),
    )
    .expect("write manifest");
    fs::write(dir.join("detalle.md"), "# Detalle\n").expect("write detail");
    fs::write(dir.join("resources/plantilla.txt"), "plantilla").expect("write resource");
    fs::write(dir.join("AUTHORING.md"), "internal notes").expect("write authoring notes");
}

fn provision(root: &Path) -> Workspace {
    Workspace::provision(
        &settings(root),
        OwnerId::parse("owner-1").expect("owner"),
        ThreadId::parse("thread-1").expect("thread"),
        None,
    )
    .expect("provision")
}

fn is_not_found(err: &FileOpError) -> bool {
    matches!(err, FileOpError::Path(VfsError::NotFound { .. }))
}

#[test]
fn skill_paths_become_visible_on_load_and_vanish_on_turn_reset() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    let workspace = provision(temp.path());

    let mut turn = workspace.begin_turn();
    let err = turn
        .read("/skills/compraventa/SKILL.md", None, None)
        .expect_err("unloaded skill must be invisible");
    assert!(is_not_found(&err));

    turn.load_skill("escrituras/compraventa").expect("load");
    let content = turn
        .read("/skills/compraventa/SKILL.md", None, None)
        .expect("read loaded skill");
    assert!(content.contains("Instrucciones."));
    turn.finish();

    let next_turn = workspace.begin_turn();
    let err = next_turn
        .read("/skills/compraventa/SKILL.md", None, None)
        .expect_err("reset must clear visibility");
    assert!(is_not_found(&err));
}

#[test]
fn unloaded_and_nonexistent_skills_are_indistinguishable() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    let workspace = provision(temp.path());

    let mut turn = workspace.begin_turn();
    turn.load_skill("escrituras/compraventa").expect("load");

    let unloaded = turn
        .read("/skills/detalle-extra/SKILL.md", None, None)
        .expect_err("unloaded");
    let nonexistent = turn
        .read("/skills/jamas-existio/SKILL.md", None, None)
        .expect_err("nonexistent");
    assert_eq!(
        std::mem::discriminant(&unloaded),
        std::mem::discriminant(&nonexistent)
    );
    assert!(is_not_found(&unloaded));
    assert!(is_not_found(&nonexistent));
}

#[test]
fn skills_listing_reflects_exactly_the_loaded_set() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    seed_skill(temp.path(), "contratos", "arrendamiento");
    let workspace = provision(temp.path());

    let mut turn = workspace.begin_turn();
    assert!(turn.list("/skills").expect("empty listing").is_empty());

    turn.load_skill("escrituras/compraventa").expect("load");
    let entries = turn.list("/skills").expect("one entry");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].virtual_path, "/skills/compraventa");
    assert!(entries[0].is_directory);
}

#[test]
fn authoring_notes_are_never_listed_nor_readable() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    let workspace = provision(temp.path());

    let mut turn = workspace.begin_turn();
    turn.load_skill("escrituras/compraventa").expect("load");

    let names: Vec<String> = turn
        .list("/skills/compraventa")
        .expect("list skill")
        .into_iter()
        .map(|entry| entry.virtual_path)
        .collect();
    assert!(names.contains(&"/skills/compraventa/SKILL.md".to_string()));
    assert!(names.contains(&"/skills/compraventa/resources".to_string()));
    assert!(!names.iter().any(|name| name.ends_with("AUTHORING.md")));

    let err = turn
        .read("/skills/compraventa/AUTHORING.md", None, None)
        .expect_err("authoring notes must stay hidden");
    assert!(is_not_found(&err));
}

#[test]
fn discovery_lists_manifests_before_any_load() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    seed_skill(temp.path(), "contratos", "arrendamiento");
    let workspace = provision(temp.path());

    let discovered = workspace.discover_skills().expect("discover");
    let ids: Vec<String> = discovered.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "contratos/arrendamiento".to_string(),
            "escrituras/compraventa".to_string()
        ]
    );
    assert_eq!(discovered[0].manifest.version, "1.0.0");
}

#[test]
fn missing_ticket_storage_degrades_to_not_found() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    // No ticket directory is ever created, so the binding degrades.
    let workspace = Workspace::provision(
        &settings(temp.path()),
        OwnerId::parse("owner-1").expect("owner"),
        ThreadId::parse("thread-1").expect("thread"),
        Some(burrow::shared::TicketId::parse("T-404").expect("ticket")),
    )
    .expect("provision despite missing ticket storage");

    let turn = workspace.begin_turn();
    let err = turn
        .read("/ticket/contract.md", None, None)
        .expect_err("degraded ticket fails closed");
    assert!(is_not_found(&err));
    assert!(turn.list("/ticket").expect("degraded listing").is_empty());
}

#[test]
fn workspace_survives_across_turns_while_skills_do_not() {
    let temp = tempdir().expect("tempdir");
    seed_skill(temp.path(), "escrituras", "compraventa");
    let workspace = provision(temp.path());

    let mut turn = workspace.begin_turn();
    turn.load_skill("escrituras/compraventa").expect("load");
    turn.write("/workspace/borrador.md", "# Borrador\n")
        .expect("write");
    turn.finish();

    let turn = workspace.begin_turn();
    assert_eq!(
        turn.read("/workspace/borrador.md", None, None).expect("read"),
        "# Borrador\n"
    );
    assert!(turn.list("/skills").expect("skills listing").is_empty());
}
