//! Event handling and user feedback

use stagehand_events::{
    AppEvent, EventLevel, EventMessage, GeneralEvent, InstallEvent, StoreEvent,
};

/// Renders application events as console output.
pub struct EventHandler {
    debug: bool,
}

impl EventHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Handle one incoming event message.
    pub fn handle_message(&mut self, message: EventMessage) {
        if message.meta.level <= EventLevel::Debug && !self.debug {
            return;
        }
        match message.event {
            AppEvent::General(event) => self.handle_general(event),
            AppEvent::Install(event) => self.handle_install(&event),
            AppEvent::Store(event) => self.handle_store(&event),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => eprintln!("warning: {message} ({context})"),
                None => eprintln!("warning: {message}"),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => eprintln!("error: {message}: {details}"),
                None => eprintln!("error: {message}"),
            },
            GeneralEvent::DebugLog { message } => eprintln!("debug: {message}"),
            GeneralEvent::OperationStarted { operation } => println!("{operation}..."),
            GeneralEvent::OperationCompleted { operation, success } => {
                if success {
                    println!("{operation}: done");
                } else {
                    println!("{operation}: failed");
                }
            }
            GeneralEvent::OperationFailed { operation, error } => {
                eprintln!("{operation}: {error}");
            }
        }
    }

    fn handle_install(&self, event: &InstallEvent) {
        match event {
            InstallEvent::Enqueued { package } => {
                println!("queued for install: {package}");
            }
            InstallEvent::Dispatched { package, backend } => {
                println!("installing {package} via {backend}");
            }
            InstallEvent::DispatchFailed {
                package,
                backend,
                error,
            } => {
                eprintln!("dispatch of {package} via {backend} failed: {error}");
            }
            InstallEvent::Finished { package, success } => {
                if *success {
                    println!("installed {package}");
                } else {
                    eprintln!("install of {package} failed");
                }
            }
            InstallEvent::SessionAbandoned { session_id } => {
                println!("abandoned stale session {session_id}");
            }
            InstallEvent::SessionAbandonFailed { session_id, error } => {
                eprintln!("could not abandon session {session_id}: {error}");
            }
            InstallEvent::SessionIgnored { session_id, owner } => {
                if self.debug {
                    let owner = owner.as_deref().unwrap_or("<unresolved>");
                    eprintln!("ignored session {session_id} owned by {owner}");
                }
            }
            InstallEvent::UninstallRequested { package } => {
                println!("uninstall requested for {package}");
            }
        }
    }

    fn handle_store(&self, event: &StoreEvent) {
        if !self.debug {
            return;
        }
        match event {
            StoreEvent::StatusChanged { package, status } => {
                eprintln!("debug: {package} -> {status}");
            }
            StoreEvent::Upserted { package } => eprintln!("debug: upserted {package}"),
            StoreEvent::Deleted { package } => eprintln!("debug: deleted {package}"),
        }
    }
}
