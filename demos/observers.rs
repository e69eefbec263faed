//! # Example: observing lifecycle events.
//!
//! Attaches the built-in `LogWriter` subscriber (requires `--features
//! logging`) and a raw bus receiver to watch registration, activation, and
//! fault traffic.

use std::sync::Arc;
use std::time::Duration;

use ctrlvisor::{
    AppRef, Application, ApplicationContainer, ControllerDefinition, ControllerManager,
    LogWriter, ManagerConfig,
};

struct ContentApp;

impl Application for ContentApp {
    fn name(&self) -> &str {
        "content"
    }
}

struct Apps;

impl ApplicationContainer for Apps {
    fn by_name(&self, app_name: &str) -> Option<AppRef> {
        (app_name == "content").then(|| Arc::new(ContentApp) as AppRef)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ControllerManager::builder(ManagerConfig::default())
        .applications(Arc::new(Apps))
        .subscriber(Arc::new(LogWriter::new()))
        .build();

    let mut raw = manager.subscribe();

    manager.register(
        "IndexController",
        ControllerDefinition::builder()
            .application("content")
            .action("list", |_, _| Ok(()))
            .build(),
    )?;

    let index = manager.load("content", "IndexController").await?;
    index.invoke("list", &[])?;

    // A failing load shows up both as a fault and on the bus.
    let _ = manager.load("content", "MissingController").await;

    while let Ok(ev) = raw.try_recv() {
        println!("raw event: {:?} seq={}", ev.kind, ev.seq);
    }

    // Let the LogWriter worker drain its queue before exiting.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}
