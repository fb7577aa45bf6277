//! In-memory GitHub used by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{SyncError, SyncResult};
use crate::gist::{BoxFuture, Gist, GistApi, GistFile, GitHubUser};

#[derive(Default)]
struct State {
    gists: Vec<Gist>,
    next_id: u32,
    created: u32,
    updated: u32,
    fail_writes: Option<u16>,
}

pub struct FakeGitHub {
    valid_token: String,
    state: Mutex<State>,
}

impl FakeGitHub {
    pub fn new(valid_token: &str) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn insert_gist(&self, id: &str, description: &str, filename: &str, content: &str) {
        let mut files = HashMap::new();
        files.insert(
            filename.to_string(),
            GistFile {
                filename: Some(filename.to_string()),
                content: Some(content.to_string()),
            },
        );
        self.state.lock().unwrap().gists.push(Gist {
            id: id.to_string(),
            description: Some(description.to_string()),
            files,
        });
    }

    pub fn remove_file(&self, id: &str, filename: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(gist) = state.gists.iter_mut().find(|g| g.id == id) {
            gist.files.remove(filename);
        }
    }

    pub fn content(&self, id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let gist = state.gists.iter().find(|g| g.id == id)?;
        gist.files.values().next()?.content.clone()
    }

    pub fn gist_count(&self) -> usize {
        self.state.lock().unwrap().gists.len()
    }

    pub fn created(&self) -> u32 {
        self.state.lock().unwrap().created
    }

    pub fn updated(&self) -> u32 {
        self.state.lock().unwrap().updated
    }

    /// Makes every create and update fail with the given status.
    pub fn fail_writes_with(&self, status: u16) {
        self.state.lock().unwrap().fail_writes = Some(status);
    }

    fn check_token(&self, token: &str) -> SyncResult<()> {
        if token == self.valid_token {
            Ok(())
        } else {
            Err(SyncError::remote(401, "GitHub API error"))
        }
    }
}

impl GistApi for FakeGitHub {
    fn current_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<GitHubUser>> {
        Box::pin(async move {
            if token != self.valid_token {
                return Err(SyncError::invalid_token("Invalid GitHub token (HTTP 401)"));
            }
            Ok(GitHubUser {
                login: "octocat".into(),
                name: Some("The Octocat".into()),
                avatar_url: "https://avatars.example.com/octocat".into(),
            })
        })
    }

    fn list_gists<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<Vec<Gist>>> {
        Box::pin(async move {
            self.check_token(token)?;
            let state = self.state.lock().unwrap();
            Ok(state
                .gists
                .iter()
                .map(|g| Gist {
                    files: g
                        .files
                        .iter()
                        .map(|(name, f)| {
                            (
                                name.clone(),
                                GistFile {
                                    filename: f.filename.clone(),
                                    content: None,
                                },
                            )
                        })
                        .collect(),
                    ..g.clone()
                })
                .collect())
        })
    }

    fn get_gist<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, SyncResult<Gist>> {
        Box::pin(async move {
            self.check_token(token)?;
            let state = self.state.lock().unwrap();
            state
                .gists
                .iter()
                .find(|g| g.id == id)
                .cloned()
                .ok_or_else(|| SyncError::remote(404, "GitHub API error"))
        })
    }

    fn create_gist<'a>(
        &'a self,
        token: &'a str,
        description: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<String>> {
        Box::pin(async move {
            self.check_token(token)?;
            let id = {
                let mut state = self.state.lock().unwrap();
                if let Some(status) = state.fail_writes {
                    return Err(SyncError::remote(status, "GitHub API error"));
                }
                state.next_id += 1;
                state.created += 1;
                format!("gist-{}", state.next_id)
            };
            self.insert_gist(&id, description, filename, content);
            Ok(id)
        })
    }

    fn update_gist<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.check_token(token)?;
            let mut state = self.state.lock().unwrap();
            if let Some(status) = state.fail_writes {
                return Err(SyncError::remote(status, "GitHub API error"));
            }
            let gist = state
                .gists
                .iter_mut()
                .find(|g| g.id == id)
                .ok_or_else(|| SyncError::remote(404, "GitHub API error"))?;
            gist.files.insert(
                filename.to_string(),
                GistFile {
                    filename: Some(filename.to_string()),
                    content: Some(content.to_string()),
                },
            );
            state.updated += 1;
            Ok(())
        })
    }
}
