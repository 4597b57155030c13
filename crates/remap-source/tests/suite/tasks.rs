use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use remap_core::{ClassEntry, Entry};
use remap_scheduler::{Scheduler, SchedulerConfig, TaskError};
use remap_source::{
    spawn_source_index, DecompileError, DecompiledClass, Decompiler, Region, SourceNode,
};

fn scheduler() -> Scheduler {
    Scheduler::new(SchedulerConfig {
        compute_threads: 1,
        background_threads: 1,
    })
}

#[derive(Default)]
struct FixedDecompiler {
    classes: HashMap<ClassEntry, DecompiledClass>,
}

impl Decompiler for FixedDecompiler {
    fn decompile(&self, class: &ClassEntry) -> Result<DecompiledClass, DecompileError> {
        self.classes
            .get(class)
            .cloned()
            .ok_or_else(|| DecompileError::ClassNotFound(class.clone()))
    }
}

struct GatedDecompiler {
    started: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Decompiler for GatedDecompiler {
    fn decompile(&self, class: &ClassEntry) -> Result<DecompiledClass, DecompileError> {
        let _ = self.started.lock().unwrap().send(());
        let _ = self
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5));
        Ok(DecompiledClass {
            text: format!("class {class} {{}}"),
            nodes: Vec::new(),
        })
    }
}

#[tokio::test]
async fn builds_an_index_off_thread() {
    let class = ClassEntry::new("a");
    let mut decompiler = FixedDecompiler::default();
    decompiler.classes.insert(
        class.clone(),
        DecompiledClass {
            text: "class a {}".to_owned(),
            nodes: vec![SourceNode::declaration(
                class.clone(),
                Some(Region::new(1, 7, 1, 8)),
            )],
        },
    );

    let task = spawn_source_index(&scheduler(), Arc::new(decompiler), class.clone());
    let index = task.join().await.unwrap().unwrap();
    assert!(index.declaration_token(&Entry::Class(class)).is_some());
}

#[tokio::test]
async fn decompiler_errors_are_reported() {
    let decompiler: Arc<dyn Decompiler> = Arc::new(FixedDecompiler::default());
    let task = spawn_source_index(&scheduler(), decompiler, ClassEntry::new("missing"));
    assert_eq!(
        task.join().await.unwrap(),
        Err(DecompileError::ClassNotFound(ClassEntry::new("missing")))
    );
}

#[tokio::test]
async fn cancelled_rebuilds_publish_nothing() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let decompiler = Arc::new(GatedDecompiler {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    });

    let task = spawn_source_index(&scheduler(), decompiler, ClassEntry::new("a"));
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    task.cancel();
    let _ = release_tx.send(());

    assert_eq!(task.join().await.unwrap_err(), TaskError::Cancelled);
}
