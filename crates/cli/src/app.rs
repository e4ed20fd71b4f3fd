use std::sync::Arc;

use anyhow::{Context, Result};
use course_client::{Client, Course};
use course_store::{
    observable::Subscription, CourseChanges, CourseStore, Courses, LoadingIndicator, Messages,
};
use log::{debug, info};

use crate::{cli::Command, config::Config};

/// Holds all application state
pub struct App {
    config: Config,
    store: CourseStore,
    messages: Messages,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::with_timeout(&config.base_url, config.timeout())
            .context("error creating http client")?;
        let loading = LoadingIndicator::with_mode(config.loading_mode);
        let messages = Messages::new();
        let store = CourseStore::new(Arc::new(client), loading, Arc::new(messages.clone()))
            .with_options(config.store);

        Ok(Self {
            config,
            store,
            messages,
        })
    }

    /// Run a command, then report anything that went wrong along the way
    pub async fn run(self, command: Command) -> Result<()> {
        let indicator = tokio::spawn(show_loading(self.store.loading().loading()));

        let res = self.run_command(command).await;

        self.store.close();
        indicator.abort();
        for e in self.messages.current() {
            eprintln!("error: {}", e);
        }

        res
    }

    async fn run_command(&self, command: Command) -> Result<()> {
        debug!("running {:?}", command);
        match command {
            Command::Init => {
                let path = self.config.save()?;
                println!("wrote config to {}", path.display());
            }
            Command::List => print_courses(&self.list().await?),
            Command::Category { name } => print_courses(&self.category(name).await?),
            Command::Save { id, changes } => {
                let changes = changes
                    .into_iter()
                    .fold(CourseChanges::new(), |c, (k, v)| c.set(k, v));
                self.save(&id, changes).await?;
            }
        };

        Ok(())
    }

    /// Every course
    pub async fn list(&self) -> Result<Courses> {
        Ok(self.store.load_all().await?)
    }

    /// The courses in one category, in display order
    pub async fn category(&self, name: String) -> Result<Vec<Course>> {
        // Subscribe first, so the view sees the load
        let mut view = self.store.filter_by_category(name);
        self.store.load_all().await?;

        Ok(std::iter::from_fn(|| view.try_next())
            .last()
            .unwrap_or_default())
    }

    /// Change a course and wait for the server to accept it, returning the changed course
    pub async fn save(&self, id: &str, changes: CourseChanges) -> Result<Course> {
        self.store.load_all().await?;
        let pending = self.store.save_course(id, changes)?;

        // Already applied locally, so show it straight away
        let course = self
            .store
            .course(id)
            .with_context(|| format!("course {} disappeared", id))?;
        print_course(&course);

        let resp = pending.await?;
        info!("server accepted change to {}: {}", id, resp);

        Ok(course)
    }
}

async fn show_loading(mut flag: Subscription<bool>) {
    while let Some(loading) = flag.next().await {
        if loading {
            eprintln!("loading...");
        }
    }
}

fn print_courses(courses: &[Course]) {
    if courses.is_empty() {
        println!("no courses");
    }
    courses.iter().for_each(print_course);
}

fn print_course(c: &Course) {
    println!(
        "{:>4}  {:<16} {:<16} {}",
        c.seq_no,
        c.id,
        c.category,
        c.description().unwrap_or_default()
    );
}
