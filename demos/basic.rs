//! # Example: register, load, and drive controllers.
//!
//! Two controller types share one application; loading swaps which one is
//! enabled, and actions dispatch through the closed handler map.

use std::sync::Arc;

use ctrlvisor::{
    AppRef, Application, ApplicationContainer, ControllerDefinition, ControllerManager,
    ManagerConfig,
};
use serde_json::json;

struct EditorApp;

impl Application for EditorApp {
    fn name(&self) -> &str {
        "editor"
    }
}

struct Apps;

impl ApplicationContainer for Apps {
    fn by_name(&self, app_name: &str) -> Option<AppRef> {
        (app_name == "editor").then(|| Arc::new(EditorApp) as AppRef)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ControllerManager::builder(ManagerConfig::default())
        .applications(Arc::new(Apps))
        .build();

    manager.register(
        "MainController",
        ControllerDefinition::builder()
            .application("editor")
            .config(json!({ "panel": "left" }))
            .action("home", |ctrl, _params| {
                println!(
                    "[{}] home action, panel={}",
                    ctrl.name(),
                    ctrl.config().map(|c| c["panel"].to_string()).unwrap_or_default()
                );
                ctrl.set_state(1);
                Ok(())
            })
            .build(),
    )?;

    manager.register(
        "PageController",
        ControllerDefinition::builder()
            .application("editor")
            .action("show", |ctrl, params| {
                println!("[{}] show action, params={params:?}", ctrl.name());
                Ok(())
            })
            .build(),
    )?;

    // First load constructs and enables MainController.
    let main = manager.load("editor", "MainController").await?;
    main.invoke("home", &[])?;
    println!("enabled: {:?}", manager.enabled_controller().map(|c| c.name().to_string()));

    // Loading PageController disables MainController first.
    let page = manager.load_by_short_name("editor", "page").await?;
    page.invoke("show", &[json!("about-us")])?;
    println!(
        "enabled: {:?}, main still enabled: {}",
        manager.enabled_controller().map(|c| c.name().to_string()),
        main.is_enabled()
    );

    // Short-name and full-name loads resolve to the same cached instance.
    let main_again = manager.load_by_short_name("editor", "main").await?;
    println!("same instance: {}", Arc::ptr_eq(&main, &main_again));

    // Unknown actions fail loudly and land in the fault log.
    let _ = main.invoke("missing", &[]);
    println!(
        "last fault: {}",
        manager.faults().last().map(|f| f.error.to_string()).unwrap_or_default()
    );

    Ok(())
}
