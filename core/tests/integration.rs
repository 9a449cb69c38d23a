//! Full view-model lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread and runtime,
//! then drives `RecipeViewModel` over real HTTP through `ReqwestTransport`
//! on the test's current-thread runtime.

use recipe_core::{ClientConfig, RecipeDraft, RecipeViewModel, RecordKey, ReqwestTransport};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn config(base_url: String) -> ClientConfig {
    ClientConfig {
        base_url,
        surface_write_errors: true,
    }
}

#[tokio::test]
async fn crud_lifecycle() {
    let vm = RecipeViewModel::from_config(&config(start_server()));

    // Step 1: load — should be empty.
    vm.load_recipes().await;
    assert!(vm.error().is_none(), "load failed: {:?}", vm.error());
    assert!(vm.recipes().is_empty());

    // Step 2: create from the form.
    vm.set_title("Integration soup");
    vm.set_ingredients("water, salt");
    vm.create_recipe().await;
    assert!(vm.error().is_none());
    let created = vm.recipes()[0].clone();
    assert_eq!(created.key, RecordKey::Persisted(1));
    assert_eq!(created.title, "Integration soup");
    assert_eq!(vm.form(), RecipeDraft::default());

    // Step 3: reload — the server persisted exactly one such recipe.
    vm.load_recipes().await;
    let titles: Vec<String> = vm.recipes().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Integration soup".to_string()]);
    let snapshot = vm.recipes();

    // Step 4: reload again — identical snapshot.
    vm.load_recipes().await;
    assert_eq!(vm.recipes(), snapshot);

    // Step 5: edit.
    vm.edit_recipe(created.key, RecipeDraft::new("Integration stew"))
        .await;
    assert!(vm.error().is_none());
    assert_eq!(vm.find(created.key).unwrap().title, "Integration stew");

    // Step 6: the edit reached the server.
    let stored = vm.handlers().get(1).await.unwrap();
    assert_eq!(stored.title.as_deref(), Some("Integration stew"));
    assert_eq!(stored.ingredients.as_deref(), Some(""));

    // Step 7: delete.
    vm.delete_recipe(created.key).await;
    assert!(vm.error().is_none());
    assert!(vm.recipes().is_empty());

    // Step 8: reload — still empty.
    vm.load_recipes().await;
    assert!(vm.recipes().is_empty());

    // Step 9: deleting again is applied locally but reported.
    vm.delete_recipe(created.key).await;
    assert_eq!(vm.error().as_deref(), Some("failed to delete recipe"));
    assert!(!vm.is_loading());
}

#[tokio::test]
async fn unreachable_backend_reports_load_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let transport = ReqwestTransport::with_client(reqwest::Client::new());
    let vm = RecipeViewModel::with_transport(&config(format!("http://{addr}")), transport);

    vm.load_recipes().await;

    assert_eq!(vm.error().as_deref(), Some("failed to load recipes"));
    assert!(!vm.is_loading());
}
