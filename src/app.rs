//! Root application module.
//!
//! Contains the main App component and the [`AppContext`] shared by every
//! view: resolved configuration, the current route, and the process-wide
//! push connection.

use leptos::prelude::*;
use log::{info, warn};

use crate::components::AppRouter;
use crate::config::{API_PREFIX, AppConfig};
use crate::core::push::ConnectivityWatch;
use crate::core::{PushChannel, RemoteClient};
use crate::models::AppRoute;
use crate::utils::{FetchTransport, StompSocket};

/// The push connection and everything that must live exactly as long as it.
struct Connection {
    channel: PushChannel,
    socket: Option<StompSocket>,
    _watch: ConnectivityWatch,
}

/// Application-wide context.
///
/// Provided at the root of the component tree; retrieve it with
/// `use_context::<AppContext>()`. The push channel is owned here and handed
/// to views explicitly, never looked up globally.
///
/// # Note
///
/// This struct is `Copy`: signals and stored values are arena handles.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub config: AppConfig,
    pub route: RwSignal<AppRoute>,
    /// Mirrors the push channel's connectivity flag.
    pub connected: RwSignal<bool>,
    connection: StoredValue<Connection, LocalStorage>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let connected = RwSignal::new(false);
        let channel = PushChannel::new();
        let watch = channel.watch(move |up| {
            connected.try_set(up);
        });
        Self {
            config,
            route: RwSignal::new(AppRoute::current()),
            connected,
            connection: StoredValue::new_local(Connection {
                channel,
                socket: None,
                _watch: watch,
            }),
        }
    }

    pub fn client(&self) -> RemoteClient<FetchTransport> {
        RemoteClient::new(FetchTransport, API_PREFIX)
    }

    pub fn channel(&self) -> PushChannel {
        self.connection.with_value(|conn| conn.channel.clone())
    }

    /// Open (or reopen) the push connection. Any previous socket is closed
    /// first, which detaches the channel and drops its routes.
    pub fn connect(&self) {
        self.connection.update_value(|conn| {
            conn.socket = None;
            match StompSocket::connect(conn.channel.clone()) {
                Ok(socket) => conn.socket = Some(socket),
                Err(err) => warn!("push channel unavailable: {}", err),
            }
        });
        info!("push connection requested");
    }
}

/// Root application component with error boundary.
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(AppConfig::from_document());
    provide_context(ctx);
    ctx.connect();

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    background: #10141c;
                    color: #e0e0e0;
                    font-family: system-ui, sans-serif;
                ">
                    <h1 style="color: #ff6b6b; margin-bottom: 1rem;">
                        "Something went wrong"
                    </h1>
                    <ul style="color: #ff6b6b; font-size: 0.9rem;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <AppRouter />
        </ErrorBoundary>
    }
}
