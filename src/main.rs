mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod player;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::Mutex;

use config::Config;
use controller::AppController;
use model::{AppModel, LocalCache, MediaApi, NavItem, Recommender, Services, UserStore, View};
use player::{spawn_tcp_bridge, PlayerAdapter};
use view::{AppView, RenderContext};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Tunedeck starting ===");

    let config = Config::load();
    // Scaffold a config file on first run so the keys are easy to find
    if config::config_path().map(|p| !p.exists()).unwrap_or(false) {
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "Could not write a default config file");
        }
    }
    let cache = LocalCache::new();

    let store = UserStore::new(config.services.user_store_url.clone());
    let media = MediaApi::new(
        config.services.media_api_url.clone(),
        config.services.media_api_key.clone(),
    );
    let recommender = Recommender::new(
        config.services.recommender_url.clone(),
        config.services.recommender_api_key.clone(),
    );
    let mailer = auth::Mailer::new(
        config.services.mailer_url.clone(),
        config.services.mailer_api_key.clone(),
    );

    // Step 1: sign in while stdout is still a plain terminal
    let session = auth::sign_in(&store, &mailer, &cache).await?;
    let user = session.user.clone();

    // Step 2: build the model from the user record + local cache
    let mut app_model = AppModel::new(cache.clone());
    app_model.set_services(Services {
        store,
        media,
        recommender,
    });

    // The last explicit local theme choice wins over the stored record
    let theme = cache.load_theme().ok().flatten().unwrap_or(user.theme);

    // The user record is the source of truth for playlists; the local
    // snapshot covers a record that has never been synced
    let (playlists, default_playlist_id) = if user.playlists.is_empty() {
        match cache.load_library() {
            Ok(Some(stored)) => (stored.playlists, stored.default_playlist_id),
            _ => (Vec::new(), None),
        }
    } else {
        (user.playlists.clone(), user.default_playlist_id.clone())
    };

    app_model.set_user(Some(user.clone())).await;
    app_model.set_theme(theme).await;
    app_model.load_library(playlists, default_playlist_id).await;

    if user.is_admin {
        let mut ui_state = app_model.ui_state.lock().await;
        ui_state.nav_items.push(NavItem {
            name: "Admin".to_string(),
            view: View::Admin,
        });
    }

    // Step 3: widget bridge + the single adapter instance
    let (link, widget_events, _bridge_task) = spawn_tcp_bridge(config.bridge.listen_addr.clone());
    let (adapter, adapter_events) = PlayerAdapter::start(Arc::new(link), widget_events);

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), adapter);
    controller.start_widget_event_listener(adapter_events);

    // Warm the discover and recommendations views concurrently
    let warmup = controller.clone();
    tokio::spawn(async move {
        futures::join!(warmup.refresh_discover(), warmup.refresh_recommendations());
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.shutdown().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Tunedeck shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let (ctx, should_quit) = {
            let model_guard = model.lock().await;

            // Notices fade out on their own after a few seconds
            model_guard.auto_clear_old_notices().await;

            let widget_available = controller.adapter.is_available().await;
            let user = model_guard.get_user().await;
            let ctx = RenderContext {
                playback: model_guard.now_playing(widget_available).await,
                ui: model_guard.get_ui_state().await,
                content: model_guard.get_content_state().await,
                playlists: model_guard.playlists().await,
                default_playlist_id: model_guard.default_playlist_id().await,
                theme: model_guard.theme().await,
                user_email: user.as_ref().map(|u| u.email.clone()),
                user_country: user.as_ref().and_then(|u| u.country.clone()),
                favorite_artists: user.map(|u| u.favorite_artists).unwrap_or_default(),
            };
            (ctx, model_guard.should_quit().await)
        };

        terminal.draw(|f| {
            AppView::render(f, &ctx);
        })?;

        // Short poll keeps the progress gauge moving smoothly
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
