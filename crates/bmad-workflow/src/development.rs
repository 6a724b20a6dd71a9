//! BMAD Development Phase - Context-Engineered Development
//! 
//! This module implements Phase 2 of BMAD: AI agents guide development
//! with intelligent context management and IDE integration.

use crate::{BMADError, ProjectArtifact, UserInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Development phase orchestrator
#[derive(Debug)]
pub struct DevelopmentPhase {
    pub agents: Vec<DevelopmentAgent>,
    pub context_engine: ContextEngine,
    pub artifacts: Vec<ProjectArtifact>,
    pub development_context: DevelopmentContext,
    pub user_input: Option<UserInput>,
}

/// Development agent specialized in implementation tasks
#[derive(Debug, Clone)]
pub struct DevelopmentAgent {
    pub id: Uuid,
    pub name: String,
    pub role: AgentRole,
    pub capabilities: Vec<String>,
    pub status: AgentStatus,
    pub performance_metrics: AgentMetrics,
    pub created_at: DateTime<Utc>,
}

/// Development agent roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentRole {
    Developer,
    CodeReviewer,
    QAEngineer,
    FrontendDeveloper,
    BackendDeveloper,
    MLEngineer,
    DevOpsEngineer,
    TechnicalWriter,
    SecurityExpert,
    PerformanceExpert,
}

/// Agent status during development
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentStatus {
    Available,
    Working,
    Reviewing,
    Testing,
    Completed,
    Error,
}

/// Performance metrics for development agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub tasks_completed: u32,
    pub success_rate: f32,
    pub average_completion_time: f32,
    pub code_quality_score: f32,
    pub test_coverage: f32,
}

/// Context engine for development phase
#[derive(Debug)]
pub struct ContextEngine {
    pub artifacts: Vec<ProjectArtifact>,
    pub development_context: DevelopmentContext,
    pub context_cache: ContextCache,
    pub intelligent_suggestions: IntelligentSuggestions,
}

/// Development context containing all relevant information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentContext {
    pub project_overview: String,
    pub technical_requirements: Vec<String>,
    pub architecture_decisions: Vec<String>,
    pub coding_standards: Vec<String>,
    pub testing_requirements: Vec<String>,
    pub deployment_requirements: Vec<String>,
    pub security_requirements: Vec<String>,
    pub performance_requirements: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub environment_setup: EnvironmentSetup,
}

/// Project dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub purpose: String,
    pub is_required: bool,
}

/// Environment setup information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSetup {
    pub development_tools: Vec<String>,
    pub build_tools: Vec<String>,
    pub testing_tools: Vec<String>,
    pub deployment_tools: Vec<String>,
    pub configuration_files: Vec<String>,
}

/// Context cache for efficient retrieval
#[derive(Debug)]
pub struct ContextCache {
    pub artifact_cache: std::collections::HashMap<Uuid, ProjectArtifact>,
    pub context_cache: std::collections::HashMap<String, String>,
    pub suggestion_cache: std::collections::HashMap<String, Vec<String>>,
}

/// Intelligent suggestions system
#[derive(Debug)]
pub struct IntelligentSuggestions {
    pub code_suggestions: Vec<CodeSuggestion>,
    pub architecture_suggestions: Vec<ArchitectureSuggestion>,
    pub testing_suggestions: Vec<TestingSuggestion>,
    pub performance_suggestions: Vec<PerformanceSuggestion>,
}

/// Code suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSuggestion {
    pub id: Uuid,
    pub suggestion_type: CodeSuggestionType,
    pub description: String,
    pub code_example: String,
    pub confidence_score: f32,
    pub context_relevance: f32,
}

/// Types of code suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CodeSuggestionType {
    Implementation,
    Optimization,
    Refactoring,
    ErrorHandling,
    Documentation,
    Testing,
}

/// Architecture suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureSuggestion {
    pub id: Uuid,
    pub component: String,
    pub suggestion: String,
    pub rationale: String,
    pub impact_assessment: String,
    pub implementation_effort: ImplementationEffort,
}

/// Implementation effort levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImplementationEffort {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Testing suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingSuggestion {
    pub id: Uuid,
    pub test_type: TestType,
    pub description: String,
    pub test_code: String,
    pub expected_outcome: String,
    pub priority: TestPriority,
}

/// Types of tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestType {
    Unit,
    Integration,
    EndToEnd,
    Performance,
    Security,
    Load,
}

/// Test priority levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Performance suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSuggestion {
    pub id: Uuid,
    pub performance_area: PerformanceArea,
    pub current_issue: String,
    pub suggested_solution: String,
    pub expected_improvement: String,
    pub implementation_complexity: ImplementationEffort,
}

/// Performance areas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PerformanceArea {
    ResponseTime,
    Throughput,
    MemoryUsage,
    CpuUsage,
    DatabasePerformance,
    NetworkLatency,
    CacheEfficiency,
}

impl DevelopmentPhase {
    /// Create a new development phase
    pub fn new(agents: Vec<DevelopmentAgent>, artifacts: Vec<ProjectArtifact>) -> Self {
        Self {
            agents,
            context_engine: ContextEngine::new(artifacts.clone()),
            artifacts,
            development_context: DevelopmentContext::default(),
            user_input: None,
        }
    }
    
    /// Start the development phase
    pub async fn start_development(&mut self, user_input: UserInput) -> Result<DevelopmentResult, BMADError> {
        tracing::info!("ðŸ”§ Starting BMAD Development Phase with {} agents", self.agents.len());
        
        self.user_input = Some(user_input.clone());
        
        // Generate development context from artifacts
        self.development_context = self.context_engine.generate_development_context(&self.artifacts, &user_input).await?;
        
        // Initialize intelligent suggestions
        self.context_engine.intelligent_suggestions = self.generate_intelligent_suggestions().await?;
        
        // Set up development environment
        let environment_setup = self.setup_development_environment().await?;
        
        // Generate initial development tasks
        let development_tasks = self.generate_development_tasks().await?;
        
        Ok(DevelopmentResult {
            development_context: self.development_context.clone(),
            environment_setup,
            development_tasks,
            intelligent_suggestions: self.context_engine.intelligent_suggestions.clone(),
            next_actions: vec![
                "Review development context".to_string(),
                "Set up development environment".to_string(),
                "Begin implementation with AI assistance".to_string(),
                "Use intelligent suggestions for guidance".to_string(),
            ],
        })
    }
    
    /// Generate intelligent suggestions based on context
    async fn generate_intelligent_suggestions(&self) -> Result<IntelligentSuggestions, BMADError> {
        let code_suggestions = self.generate_code_suggestions().await?;
        let architecture_suggestions = self.generate_architecture_suggestions().await?;
        let testing_suggestions = self.generate_testing_suggestions().await?;
        let performance_suggestions = self.generate_performance_suggestions().await?;
        
        Ok(IntelligentSuggestions {
            code_suggestions,
            architecture_suggestions,
            testing_suggestions,
            performance_suggestions,
        })
    }
    
    /// Generate code suggestions
    async fn generate_code_suggestions(&self) -> Result<Vec<CodeSuggestion>, BMADError> {
        let mut suggestions = Vec::new();
        
        // Generate suggestions based on artifacts
        for artifact in &self.artifacts {
            match artifact.artifact_type.as_str() {
                "APISpecification" => {
                    suggestions.push(CodeSuggestion {
                        id: Uuid::new_v4(),
                        suggestion_type: CodeSuggestionType::Implementation,
                        description: "Implement API endpoints based on specification".to_string(),
                        code_example: "// Example API endpoint implementation\napp.get('/api/users', async (req, res) => {\n  // Implementation here\n});".to_string(),
                        confidence_score: 0.9,
                        context_relevance: 0.95,
                    });
                },
                "DatabaseSchema" => {
                    suggestions.push(CodeSuggestion {
                        id: Uuid::new_v4(),
                        suggestion_type: CodeSuggestionType::Implementation,
                        description: "Implement database models and migrations".to_string(),
                        code_example: "// Example database model\nclass User {\n  constructor(data) {\n    this.id = data.id;\n    this.email = data.email;\n  }\n}".to_string(),
                        confidence_score: 0.85,
                        context_relevance: 0.9,
                    });
                },
                _ => {}
            }
        }
        
        Ok(suggestions)
    }
    
    /// Generate architecture suggestions
    async fn generate_architecture_suggestions(&self) -> Result<Vec<ArchitectureSuggestion>, BMADError> {
        let mut suggestions = Vec::new();
        
        // Find technical architecture artifact
        if let Some(arch_artifact) = self.artifacts.iter().find(|a| a.artifact_type == "TechnicalArchitecture") {
            suggestions.push(ArchitectureSuggestion {
                id: Uuid::new_v4(),
                component: "API Layer".to_string(),
                suggestion: "Implement RESTful API with proper error handling".to_string(),
                rationale: "Based on technical architecture requirements".to_string(),
                impact_assessment: "High impact on system functionality".to_string(),
                implementation_effort: ImplementationEffort::Medium,
            });
            
            suggestions.push(ArchitectureSuggestion {
                id: Uuid::new_v4(),
                component: "Database Layer".to_string(),
                suggestion: "Implement data access layer with connection pooling".to_string(),
                rationale: "Ensures efficient database operations".to_string(),
                impact_assessment: "Medium impact on performance".to_string(),
                implementation_effort: ImplementationEffort::Low,
            });
        }
        
        Ok(suggestions)
    }
    
    /// Generate testing suggestions
    async fn generate_testing_suggestions(&self) -> Result<Vec<TestingSuggestion>, BMADError> {
        let mut suggestions = Vec::new();
        
        // Generate testing suggestions based on project type
        if let Some(user_input) = &self.user_input {
            suggestions.push(TestingSuggestion {
                id: Uuid::new_v4(),
                test_type: TestType::Unit,
                description: "Write unit tests for core business logic".to_string(),
                test_code: "// Example unit test\ndescribe('UserService', () => {\n  it('should create user successfully', async () => {\n    // Test implementation\n  });\n});".to_string(),
                expected_outcome: "All unit tests pass with 80%+ coverage".to_string(),
                priority: TestPriority::High,
            });
            
            suggestions.push(TestingSuggestion {
                id: Uuid::new_v4(),
                test_type: TestType::Integration,
                description: "Write integration tests for API endpoints".to_string(),
                test_code: "// Example integration test\ndescribe('API Integration', () => {\n  it('should handle user creation flow', async () => {\n    // Integration test implementation\n  });\n});".to_string(),
                expected_outcome: "API endpoints work correctly with database".to_string(),
                priority: TestPriority::Medium,
            });
        }
        
        Ok(suggestions)
    }
    
    /// Generate performance suggestions
    async fn generate_performance_suggestions(&self) -> Result<Vec<PerformanceSuggestion>, BMADError> {
        let mut suggestions = Vec::new();
        
        suggestions.push(PerformanceSuggestion {
            id: Uuid::new_v4(),
            performance_area: PerformanceArea::ResponseTime,
            current_issue: "API response times may be slow".to_string(),
            suggested_solution: "Implement caching and database query optimization".to_string(),
            expected_improvement: "50% reduction in response time".to_string(),
            implementation_complexity: ImplementationEffort::Medium,
        });
        
        suggestions.push(PerformanceSuggestion {
            id: Uuid::new_v4(),
            performance_area: PerformanceArea::MemoryUsage,
            current_issue: "Memory usage may be high".to_string(),
            suggested_solution: "Implement memory pooling and garbage collection optimization".to_string(),
            expected_improvement: "30% reduction in memory usage".to_string(),
            implementation_complexity: ImplementationEffort::High,
        });
        
        Ok(suggestions)
    }
    
    /// Set up development environment
    async fn setup_development_environment(&self) -> Result<EnvironmentSetup, BMADError> {
        let environment_setup = EnvironmentSetup {
            development_tools: vec![
                "VS Code".to_string(),
                "Git".to_string(),
                "Node.js".to_string(),
                "TypeScript".to_string(),
            ],
            build_tools: vec![
                "Webpack".to_string(),
                "Babel".to_string(),
                "ESLint".to_string(),
                "Prettier".to_string(),
            ],
            testing_tools: vec![
                "Jest".to_string(),
                "Cypress".to_string(),
                "Supertest".to_string(),
            ],
            deployment_tools: vec![
                "Docker".to_string(),
                "Kubernetes".to_string(),
                "GitHub Actions".to_string(),
            ],
            configuration_files: vec![
                "package.json".to_string(),
                "tsconfig.json".to_string(),
                "webpack.config.js".to_string(),
                "jest.config.js".to_string(),
            ],
        };
        
        Ok(environment_setup)
    }
    
    /// Generate development tasks
    async fn generate_development_tasks(&self) -> Result<Vec<DevelopmentTask>, BMADError> {
        let mut tasks = Vec::new();
        
        // Generate tasks based on artifacts
        for artifact in &self.artifacts {
            match artifact.artifact_type.as_str() {
                "PRD" => {
                    tasks.push(DevelopmentTask {
                        id: Uuid::new_v4(),
                        name: "Implement Core Features".to_string(),
                        description: "Implement features defined in PRD".to_string(),
                        priority: TaskPriority::High,
                        estimated_effort: ImplementationEffort::High,
                        dependencies: vec![],
                        acceptance_criteria: vec![
                            "All features from PRD are implemented".to_string(),
                            "Features meet acceptance criteria".to_string(),
                        ],
                    });
                },
                "TechnicalArchitecture" => {
                    tasks.push(DevelopmentTask {
                        id: Uuid::new_v4(),
                        name: "Set Up Project Structure".to_string(),
                        description: "Create project structure based on architecture".to_string(),
                        priority: TaskPriority::Critical,
                        estimated_effort: ImplementationEffort::Medium,
                        dependencies: vec![],
                        acceptance_criteria: vec![
                            "Project structure matches architecture".to_string(),
                            "All necessary directories created".to_string(),
                        ],
                    });
                },
                "APISpecification" => {
                    tasks.push(DevelopmentTask {
                        id: Uuid::new_v4(),
                        name: "Implement API Endpoints".to_string(),
                        description: "Implement all API endpoints from specification".to_string(),
                        priority: TaskPriority::High,
                        estimated_effort: ImplementationEffort::High,
                        dependencies: vec!["Set Up Project Structure".to_string()],
                        acceptance_criteria: vec![
                            "All API endpoints implemented".to_string(),
                            "API follows specification".to_string(),
                            "Proper error handling implemented".to_string(),
                        ],
                    });
                },
                _ => {}
            }
        }
        
        Ok(tasks)
    }
}

impl DevelopmentAgent {
    /// Create a new development agent
    pub fn new(name: String, role: AgentRole, capabilities: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
            capabilities,
            status: AgentStatus::Available,
            performance_metrics: AgentMetrics {
                tasks_completed: 0,
                success_rate: 1.0,
                average_completion_time: 0.0,
                code_quality_score: 0.8,
                test_coverage: 0.0,
            },
            created_at: Utc::now(),
        }
    }
    
    /// Check if agent can handle a specific task
    pub fn can_handle_task(&self, task_type: &str) -> bool {
        self.capabilities.contains(&task_type.to_string())
    }
    
    /// Update agent status
    pub fn update_status(&mut self, status: AgentStatus) {
        self.status = status;
    }
    
    /// Record task completion
    pub fn record_task_completion(&mut self, success: bool, completion_time: f32, quality_score: f32) {
        self.performance_metrics.tasks_completed += 1;
        
        // Update success rate
        let total_tasks = self.performance_metrics.tasks_completed as f32;
        let current_successes = self.performance_metrics.success_rate * (total_tasks - 1.0);
        let new_successes = if success { current_successes + 1.0 } else { current_successes };
        self.performance_metrics.success_rate = new_successes / total_tasks;
        
        // Update average completion time
        let current_avg = self.performance_metrics.average_completion_time;
        let new_avg = (current_avg * (total_tasks - 1.0) + completion_time) / total_tasks;
        self.performance_metrics.average_completion_time = new_avg;
        
        // Update code quality score
        let current_quality = self.performance_metrics.code_quality_score;
        let new_quality = (current_quality * (total_tasks - 1.0) + quality_score) / total_tasks;
        self.performance_metrics.code_quality_score = new_quality;
    }
}

impl ContextEngine {
    /// Create a new context engine
    pub fn new(artifacts: Vec<ProjectArtifact>) -> Self {
        Self {
            artifacts,
            development_context: DevelopmentContext::default(),
            context_cache: ContextCache {
                artifact_cache: std::collections::HashMap::new(),
                context_cache: std::collections::HashMap::new(),
                suggestion_cache: std::collections::HashMap::new(),
            },
            intelligent_suggestions: IntelligentSuggestions {
                code_suggestions: Vec::new(),
                architecture_suggestions: Vec::new(),
                testing_suggestions: Vec::new(),
                performance_suggestions: Vec::new(),
            },
        }
    }
    
    /// Generate development context from artifacts
    pub async fn generate_development_context(&self, artifacts: &[ProjectArtifact], user_input: &UserInput) -> Result<DevelopmentContext, BMADError> {
        let mut context = DevelopmentContext::default();
        
        // Extract information from artifacts
        for artifact in artifacts {
            match artifact.artifact_type.as_str() {
                "PRD" => {
                    context.project_overview = artifact.content.clone();
                },
                "TechnicalArchitecture" => {
                    context.architecture_decisions.push(artifact.content.clone());
                },
                "APISpecification" => {
                    context.technical_requirements.push("API Implementation".to_string());
                },
                "DatabaseSchema" => {
                    context.technical_requirements.push("Database Implementation".to_string());
                },
                "TestingStrategy" => {
                    context.testing_requirements.push(artifact.content.clone());
                },
                "SecurityPlan" => {
                    context.security_requirements.push(artifact.content.clone());
                },
                "PerformancePlan" => {
                    context.performance_requirements.push(artifact.content.clone());
                },
                "DeploymentPlan" => {
                    context.deployment_requirements.push(artifact.content.clone());
                },
                _ => {}
            }
        }
        
        // Add technical preferences from user input
        context.technical_requirements.extend(user_input.technical_preferences.clone());
        
        // Set up coding standards
        context.coding_standards = vec![
            "Follow TypeScript best practices".to_string(),
            "Use ESLint and Prettier for code formatting".to_string(),
            "Write comprehensive unit tests".to_string(),
            "Document all public APIs".to_string(),
            "Use meaningful variable and function names".to_string(),
        ];
        
        // Set up dependencies
        context.dependencies = vec![
            Dependency {
                name: "express".to_string(),
                version: "^4.18.0".to_string(),
                purpose: "Web framework".to_string(),
                is_required: true,
            },
            Dependency {
                name: "typescript".to_string(),
                version: "^5.0.0".to_string(),
                purpose: "TypeScript compiler".to_string(),
                is_required: true,
            },
            Dependency {
                name: "jest".to_string(),
                version: "^29.0.0".to_string(),
                purpose: "Testing framework".to_string(),
                is_required: true,
            },
        ];
        
        Ok(context)
    }
}

impl Default for DevelopmentContext {
    fn default() -> Self {
        Self {
            project_overview: String::new(),
            technical_requirements: Vec::new(),
            architecture_decisions: Vec::new(),
            coding_standards: Vec::new(),
            testing_requirements: Vec::new(),
            deployment_requirements: Vec::new(),
            security_requirements: Vec::new(),
            performance_requirements: Vec::new(),
            dependencies: Vec::new(),
            environment_setup: EnvironmentSetup {
                development_tools: Vec::new(),
                build_tools: Vec::new(),
                testing_tools: Vec::new(),
                deployment_tools: Vec::new(),
                configuration_files: Vec::new(),
            },
        }
    }
}

/// Development task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentTask {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub estimated_effort: ImplementationEffort,
    pub dependencies: Vec<String>,
    pub acceptance_criteria: Vec<String>,
}

/// Task priority levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Development result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentResult {
    pub development_context: DevelopmentContext,
    pub environment_setup: EnvironmentSetup,
    pub development_tasks: Vec<DevelopmentTask>,
    pub intelligent_suggestions: IntelligentSuggestions,
    pub next_actions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_development_agent_creation() {
        let agent = DevelopmentAgent::new(
            "Test Developer".to_string(),
            AgentRole::Developer,
            vec!["coding".to_string(), "testing".to_string()]
        );
        
        assert_eq!(agent.name, "Test Developer");
        assert!(matches!(agent.role, AgentRole::Developer));
        assert_eq!(agent.capabilities.len(), 2);
        assert!(matches!(agent.status, AgentStatus::Available));
    }
    
    #[test]
    fn test_context_engine_creation() {
        let artifacts = vec![];
        let engine = ContextEngine::new(artifacts);
        
        assert!(engine.artifacts.is_empty());
        assert!(engine.context_cache.artifact_cache.is_empty());
    }
    
    #[tokio::test]
    async fn test_development_context_generation() {
        let artifacts = vec![
            ProjectArtifact {
                id: Uuid::new_v4(),
                artifact_type: "PRD".to_string(),
                title: "Test PRD".to_string(),
                content: "Test project overview".to_string(),
                metadata: crate::planning::ArtifactMetadata {
                    complexity_score: 0.5,
                    completeness_score: 0.8,
                    quality_score: 0.7,
                    tags: vec!["test".to_string()],
                    review_status: crate::planning::ReviewStatus::Draft,
                    approval_status: crate::planning::ApprovalStatus::Pending,
                },
                created_by: "Test Agent".to_string(),
                created_at: Utc::now().to_rfc3339(),
                version: 1,
                dependencies: vec![],
            }
        ];
        
        let user_input = UserInput {
            project_name: "Test Project".to_string(),
            project_description: "Test description".to_string(),
            target_users: vec!["developers".to_string()],
            key_features: vec!["feature1".to_string()],
            constraints: vec!["constraint1".to_string()],
            success_metrics: vec!["metric1".to_string()],
            timeline: Some("1 month".to_string()),
            budget: Some("$10k".to_string()),
            technical_preferences: vec!["TypeScript".to_string()],
        };
        
        let engine = ContextEngine::new(artifacts);
        let context = engine.generate_development_context(&engine.artifacts, &user_input).await.unwrap();
        
        assert_eq!(context.project_overview, "Test project overview");
        assert!(context.technical_requirements.contains(&"TypeScript".to_string()));
    }
}
