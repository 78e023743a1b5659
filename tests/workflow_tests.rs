//! End-to-end tests of the library: persona store, selection and note
//! generation working together over file persistence.

use std::time::Duration;

use tempfile::TempDir;

use persona_notes::error::Error;
use persona_notes::note::{
    copy_to_clipboard, persona_label, FixedNoteGenerator, GenerationParams, MemoryClipboard,
    NoteSession,
};
use persona_notes::persona::{
    JsonFilePersistence, Persona, PersonaGenerator, PersonaRequest, PersonaStore,
    StubPersonaGenerator,
};
use persona_notes::selection::SelectionSet;

fn open_store(dir: &TempDir) -> PersonaStore<JsonFilePersistence> {
    let persistence = JsonFilePersistence::new(
        dir.path().join("personas.json"),
        dir.path().join("selected-persona.txt"),
    );
    PersonaStore::open(persistence).unwrap()
}

async fn create(store: &mut PersonaStore<JsonFilePersistence>, nickname: &str) -> Persona {
    let generator = StubPersonaGenerator::new(Duration::ZERO);
    let request = PersonaRequest::new("下班后自学提升", "初入职场毕业生");
    let mut persona = generator.generate(&request, store.next_id()).await.unwrap();
    persona.nickname = nickname.to_string();
    store.add(persona.clone()).unwrap();
    persona
}

#[tokio::test]
async fn test_multi_persona_generation_and_reload() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let a = create(&mut store, "阿北").await;
    let b = create(&mut store, "小美").await;
    assert_ne!(a.id, b.id);

    // Toggle both on, one off and on again
    let mut selection = SelectionSet::new();
    selection.toggle(b.id.clone());
    selection.toggle(a.id.clone());
    selection.toggle(b.id.clone());
    selection.toggle(b.id.clone());

    let personas = store.resolve(&selection).unwrap();
    assert_eq!(personas, vec![a.clone(), b.clone()]);

    let mut session = NoteSession::new(FixedNoteGenerator::new(Duration::ZERO));
    let notes = session
        .generate(&personas, &mut GenerationParams::poster())
        .await
        .unwrap()
        .to_vec();

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, "阿北：纠结折叠屏，但游戏体验让我动心");
    assert_eq!(notes[1].title, "小美：纠结折叠屏，但游戏体验让我动心");
    assert_eq!(persona_label(&notes[0], store.list()), "阿北");

    let mut clipboard = MemoryClipboard::default();
    copy_to_clipboard(&notes[1], &mut clipboard).unwrap();
    assert!(clipboard.contents.unwrap().starts_with("小美："));

    // A fresh store sees the same collection
    let reopened = open_store(&dir);
    assert_eq!(reopened.list(), store.list());
}

#[tokio::test]
async fn test_deleting_personas_orphans_their_notes() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let a = create(&mut store, "阿北").await;
    let b = create(&mut store, "小美").await;

    let mut session = NoteSession::new(FixedNoteGenerator::new(Duration::ZERO));
    session
        .generate(&[a.clone(), b.clone()], &mut GenerationParams::image("折叠屏"))
        .await
        .unwrap();

    let doomed: SelectionSet<String> = [a.id.clone()].into_iter().collect();
    assert_eq!(store.remove_by_ids(&doomed).unwrap(), 1);

    let grouped = session.group_by_persona(store.list());
    assert_eq!(grouped.groups.len(), 1);
    assert_eq!(grouped.groups[0].persona.id, b.id);
    assert_eq!(grouped.orphans.len(), 1);
    assert!(grouped.orphans[0].is_for(&a.id));
    assert_eq!(persona_label(grouped.orphans[0], store.list()), a.id);
}

#[tokio::test]
async fn test_generated_personas_get_distinct_note_titles() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let generator = StubPersonaGenerator::new(Duration::ZERO);
    let request = PersonaRequest::new("下班后自学提升", "初入职场毕业生");
    for _ in 0..2 {
        let persona = generator.generate(&request, store.next_id()).await.unwrap();
        store.add(persona).unwrap();
    }

    let selection: SelectionSet<String> = store.list().iter().map(|p| p.id.clone()).collect();
    let personas = store.resolve(&selection).unwrap();
    assert_eq!(personas[0].nickname, personas[1].nickname);

    let mut session = NoteSession::new(FixedNoteGenerator::new(Duration::ZERO));
    let notes = session
        .generate(&personas, &mut GenerationParams::poster())
        .await
        .unwrap();

    assert_eq!(notes.len(), 2);
    assert_ne!(notes[0].title, notes[1].title);
}

#[tokio::test]
async fn test_selection_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let a = create(&mut store, "阿北").await;
    store.select(&a.id).unwrap();

    let reopened = open_store(&dir);
    assert_eq!(reopened.selected().map(|p| p.id.as_str()), Some(a.id.as_str()));
}

#[tokio::test]
async fn test_empty_selection_generates_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let personas = store.resolve(&SelectionSet::new()).unwrap();
    let mut session = NoteSession::new(FixedNoteGenerator::new(Duration::ZERO));
    let err = session
        .generate(&personas, &mut GenerationParams::poster())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoPersonaSelected));
    assert!(err.is_validation());
    assert!(session.is_empty());
}
