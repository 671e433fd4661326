use crate::config::AnalyzerConfig;
use crate::project::{Project, ProjectAnalysis, ProjectError};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// All projects known to a running service, keyed by project id.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    projects: BTreeMap<String, Project>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a project, returning the previous one.
    pub fn insert(&mut self, project: Project) -> Option<Project> {
        self.projects.insert(project.id().to_string(), project)
    }

    pub fn get(&self, project_id: &str) -> Option<&Project> {
        self.projects.get(project_id)
    }

    pub fn get_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.get_mut(project_id)
    }

    pub fn remove(&mut self, project_id: &str) -> Option<Project> {
        self.projects.remove(project_id)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.projects.contains_key(project_id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Analyzes every project in parallel. Results follow project id order;
    /// one project failing does not affect the others.
    pub fn analyze_all(
        &self,
        config: &AnalyzerConfig,
    ) -> Vec<(String, Result<ProjectAnalysis, ProjectError>)> {
        let projects: Vec<&Project> = self.projects.values().collect();
        projects
            .par_iter()
            .map(|project| (project.id().to_string(), project.analyze(config)))
            .collect()
    }
}
