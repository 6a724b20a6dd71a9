use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::{Config, DatabaseType};
use crate::DatabaseOperationRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub execution_time_ms: f64,
    pub rows_examined: u64,
    pub rows_returned: u64,
    pub cpu_cost: f64,
    pub io_cost: f64,
    pub memory_usage_mb: f64,
    pub index_usage: Vec<String>,
    pub table_scans: Vec<String>,
    pub recommendations: Vec<OptimizationRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub category: OptimizationCategory,
    pub priority: RecommendationPriority,
    pub description: String,
    pub impact_score: f64,
    pub effort_required: EffortLevel,
    pub implementation_steps: Vec<String>,
    pub expected_improvement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OptimizationCategory {
    #[serde(rename = "index_optimization")]
    IndexOptimization,
    #[serde(rename = "query_rewrite")]
    QueryRewrite,
    #[serde(rename = "schema_optimization")]
    SchemaOptimization,
    #[serde(rename = "caching")]
    Caching,
    #[serde(rename = "partitioning")]
    Partitioning,
    #[serde(rename = "statistics_update")]
    StatisticsUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecommendationPriority {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "critical")]
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EffortLevel {
    #[serde(rename = "minimal")]
    Minimal,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasePerformanceReport {
    pub database_name: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub overall_performance_score: f64,
    pub slow_queries: Vec<QueryAnalysis>,
    pub index_recommendations: Vec<IndexRecommendation>,
    pub schema_issues: Vec<SchemaIssue>,
    pub cache_statistics: CacheStatistics,
    pub optimization_opportunities: Vec<OptimizationRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub table_name: String,
    pub columns: Vec<String>,
    pub index_type: String,
    pub estimated_impact: f64,
    pub current_queries_affected: u32,
    pub creation_sql: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub issue_type: String,
    pub table_name: String,
    pub column_name: Option<String>,
    pub severity: String,
    pub description: String,
    pub fix_suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub hit_ratio: f64,
    pub miss_count: u64,
    pub eviction_count: u64,
    pub memory_usage_mb: f64,
    pub recommendations: Vec<String>,
}

pub struct QueryOptimizer {
    config: Config,
    query_history: RwLock<HashMap<String, Vec<QueryAnalysis>>>,
    optimization_cache: RwLock<HashMap<String, DatabasePerformanceReport>>,
    http_client: reqwest::Client,
}

impl QueryOptimizer {
    pub async fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let optimizer = Self {
            config: config.clone(),
            query_history: RwLock::new(HashMap::new()),
            optimization_cache: RwLock::new(HashMap::new()),
            http_client,
        };

        // Initialize with sample data
        optimizer.initialize_sample_data().await?;

        info!("🚀 Query Optimizer initialized");
        Ok(optimizer)
    }

    async fn initialize_sample_data(&self) -> Result<()> {
        let mut history = self.query_history.write().await;
        
        for (database_name, database_config) in &self.config.databases {
            if !database_config.optimization_enabled {
                continue;
            }

            let sample_queries = self.generate_sample_queries(&database_config.database_type).await;
            history.insert(database_name.clone(), sample_queries);
            
            debug!("📊 Initialized query history for database: {}", database_name);
        }

        Ok(())
    }

    async fn generate_sample_queries(&self, database_type: &DatabaseType) -> Vec<QueryAnalysis> {
        match database_type {
            DatabaseType::PostgreSQL => vec![
                QueryAnalysis {
                    query: "SELECT * FROM users WHERE email = 'user@example.com'".to_string(),
                    execution_time_ms: 45.2,
                    rows_examined: 10000,
                    rows_returned: 1,
                    cpu_cost: 2.1,
                    io_cost: 8.5,
                    memory_usage_mb: 12.3,
                    index_usage: vec!["users_email_idx".to_string()],
                    table_scans: vec![],
                    recommendations: vec![
                        OptimizationRecommendation {
                            category: OptimizationCategory::IndexOptimization,
                            priority: RecommendationPriority::Medium,
                            description: "Consider creating a unique index on email column".to_string(),
                            impact_score: 7.5,
                            effort_required: EffortLevel::Low,
                            implementation_steps: vec![
                                "CREATE UNIQUE INDEX users_email_unique ON users(email);".to_string(),
                            ],
                            expected_improvement: "60% faster email lookups".to_string(),
                        }
                    ],
                },
                QueryAnalysis {
                    query: "SELECT COUNT(*) FROM orders WHERE created_at > '2024-01-01'".to_string(),
                    execution_time_ms: 123.8,
                    rows_examined: 50000,
                    rows_returned: 1,
                    cpu_cost: 5.2,
                    io_cost: 15.3,
                    memory_usage_mb: 8.1,
                    index_usage: vec![],
                    table_scans: vec!["orders".to_string()],
                    recommendations: vec![
                        OptimizationRecommendation {
                            category: OptimizationCategory::IndexOptimization,
                            priority: RecommendationPriority::High,
                            description: "Create index on created_at column for time-based queries".to_string(),
                            impact_score: 9.2,
                            effort_required: EffortLevel::Low,
                            implementation_steps: vec![
                                "CREATE INDEX orders_created_at_idx ON orders(created_at);".to_string(),
                            ],
                            expected_improvement: "85% faster time-based queries".to_string(),
                        }
                    ],
                },
            ],
            DatabaseType::MySQL => vec![
                QueryAnalysis {
                    query: "SELECT p.*, c.name FROM products p JOIN categories c ON p.category_id = c.id WHERE p.price > 100".to_string(),
                    execution_time_ms: 78.5,
                    rows_examined: 25000,
                    rows_returned: 1500,
                    cpu_cost: 3.8,
                    io_cost: 12.1,
                    memory_usage_mb: 15.6,
                    index_usage: vec!["products_category_idx".to_string()],
                    table_scans: vec![],
                    recommendations: vec![
                        OptimizationRecommendation {
                            category: OptimizationCategory::IndexOptimization,
                            priority: RecommendationPriority::Medium,
                            description: "Create composite index on price and category_id".to_string(),
                            impact_score: 6.8,
                            effort_required: EffortLevel::Low,
                            implementation_steps: vec![
                                "CREATE INDEX products_price_category_idx ON products(price, category_id);".to_string(),
                            ],
                            expected_improvement: "45% faster price-based category queries".to_string(),
                        }
                    ],
                },
            ],
            DatabaseType::SQLite => vec![
                QueryAnalysis {
                    query: "SELECT * FROM cache_entries WHERE key = ? AND expires_at > datetime('now')".to_string(),
                    execution_time_ms: 15.2,
                    rows_examined: 1000,
                    rows_returned: 1,
                    cpu_cost: 0.5,
                    io_cost: 2.1,
                    memory_usage_mb: 1.2,
                    index_usage: vec!["cache_key_idx".to_string()],
                    table_scans: vec![],
                    recommendations: vec![],
                },
            ],
            DatabaseType::MongoDB => vec![
                QueryAnalysis {
                    query: "db.users.find({status: 'active', lastLogin: {$gte: ISODate('2024-01-01')}})".to_string(),
                    execution_time_ms: 95.3,
                    rows_examined: 15000,
                    rows_returned: 2500,
                    cpu_cost: 4.2,
                    io_cost: 10.8,
                    memory_usage_mb: 18.5,
                    index_usage: vec!["users_status_lastLogin".to_string()],
                    table_scans: vec![],
                    recommendations: vec![
                        OptimizationRecommendation {
                            category: OptimizationCategory::IndexOptimization,
                            priority: RecommendationPriority::Medium,
                            description: "Optimize compound index order for better performance".to_string(),
                            impact_score: 7.0,
                            effort_required: EffortLevel::Medium,
                            implementation_steps: vec![
                                "db.users.createIndex({lastLogin: 1, status: 1})".to_string(),
                            ],
                            expected_improvement: "30% faster active user queries".to_string(),
                        }
                    ],
                },
            ],
        }
    }

    pub async fn monitor_queries(&self) -> Result<()> {
        debug!("🔍 Monitoring database queries for performance");

        for (database_name, database_config) in &self.config.databases {
            if !database_config.optimization_enabled {
                continue;
            }

            match self.analyze_database_queries(database_name).await {
                Ok(_) => {
                    debug!("✅ Query monitoring completed for: {}", database_name);
                }
                Err(e) => {
                    warn!("⚠️ Query monitoring failed for {}: {}", database_name, e);
                }
            }
        }

        Ok(())
    }

    async fn analyze_database_queries(&self, database_name: &str) -> Result<()> {
        debug!("📊 Analyzing queries for database: {}", database_name);

        // In a real implementation, this would:
        // 1. Connect to the database
        // 2. Query the performance schema or similar
        // 3. Analyze slow queries and execution plans
        // 4. Update query history and recommendations

        // Simulate query analysis
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        // Generate performance report
        let report = self.generate_performance_report(database_name).await?;
        
        // Cache the report
        let mut cache = self.optimization_cache.write().await;
        cache.insert(database_name.to_string(), report);

        Ok(())
    }

    async fn generate_performance_report(&self, database_name: &str) -> Result<DatabasePerformanceReport> {
        let history = self.query_history.read().await;
        let queries = history.get(database_name).unwrap_or(&Vec::new()).clone();

        // Calculate overall performance score
        let mut total_score: f64 = 100.0;
        let mut slow_queries = Vec::new();

        for query in &queries {
            if query.execution_time_ms > self.config.thresholds.query_time_warning {
                slow_queries.push(query.clone());
                total_score -= 5.0; // Penalty for each slow query
            }
        }

        total_score = total_score.max(0.0);

        // Generate index recommendations
        let index_recommendations = self.generate_index_recommendations(database_name, &queries).await?;
        
        // Generate schema issue analysis
        let schema_issues = self.analyze_schema_issues(database_name).await?;
        
        // Generate cache statistics
        let cache_statistics = self.generate_cache_statistics(database_name).await?;
        
        // Collect all optimization opportunities
        let mut optimization_opportunities = Vec::new();
        for query in &queries {
            optimization_opportunities.extend(query.recommendations.clone());
        }

        let report = DatabasePerformanceReport {
            database_name: database_name.to_string(),
            timestamp: chrono::Utc::now(),
            overall_performance_score: total_score,
            slow_queries,
            index_recommendations,
            schema_issues,
            cache_statistics,
            optimization_opportunities,
        };

        Ok(report)
    }

    async fn generate_index_recommendations(&self, _database_name: &str, queries: &[QueryAnalysis]) -> Result<Vec<IndexRecommendation>> {
        let mut recommendations = Vec::new();

        // Analyze queries for missing indexes
        for query in queries {
            if !query.table_scans.is_empty() {
                for table in &query.table_scans {
                    recommendations.push(IndexRecommendation {
                        table_name: table.clone(),
                        columns: vec!["id".to_string()], // Simplified
                        index_type: "btree".to_string(),
                        estimated_impact: 8.5,
                        current_queries_affected: 1,
                        creation_sql: format!("CREATE INDEX {}_perf_idx ON {} (id)", table, table),
                    });
                }
            }
        }

        Ok(recommendations)
    }

    async fn analyze_schema_issues(&self, _database_name: &str) -> Result<Vec<SchemaIssue>> {
        // In a real implementation, this would analyze:
        // - Missing foreign key constraints
        // - Inappropriate data types
        // - Normalization issues
        // - Unused indexes
        
        Ok(vec![
            SchemaIssue {
                issue_type: "Missing Index".to_string(),
                table_name: "users".to_string(),
                column_name: Some("email".to_string()),
                severity: "Medium".to_string(),
                description: "Email column frequently queried but not indexed".to_string(),
                fix_suggestion: "CREATE INDEX users_email_idx ON users(email)".to_string(),
            },
        ])
    }

    async fn generate_cache_statistics(&self, _database_name: &str) -> Result<CacheStatistics> {
        // In a real implementation, this would query actual cache statistics
        Ok(CacheStatistics {
            hit_ratio: 92.5,
            miss_count: 1250,
            eviction_count: 45,
            memory_usage_mb: 256.8,
            recommendations: vec![
                "Increase cache size for better hit ratio".to_string(),
                "Consider warming cache for frequently accessed data".to_string(),
            ],
        })
    }

    pub async fn optimize_database(&self, request: &DatabaseOperationRequest) -> Result<crate::DatabaseOperationResponse> {
        info!("🔧 Optimizing database performance");

        let database_name = request.database_name.as_ref()
            .ok_or_else(|| anyhow!("Database name required for optimization"))?;

        let optimization_type = request.parameters.as_ref()
            .and_then(|p| p.get("optimization_type"))
            .and_then(|v| v.as_str())
            .unwrap_or("comprehensive");

        // Generate optimization plan
        let optimization_plan = self.create_optimization_plan(database_name, optimization_type).await?;
        
        // Execute optimizations
        let results = self.execute_optimization_plan(database_name, &optimization_plan).await?;

        let details = serde_json::json!({
            "database_name": database_name,
            "optimization_type": optimization_type,
            "optimizations_applied": results.len(),
            "estimated_improvement": "25-40% performance improvement",
            "next_review_date": chrono::Utc::now() + chrono::Duration::days(30)
        });

        Ok(crate::DatabaseOperationResponse {
            operation_id: "".to_string(),
            status: "completed".to_string(),
            message: format!("Database optimization completed for: {}", database_name),
            details: Some(details),
            estimated_duration: Some(180), // 3 minutes
        })
    }

    async fn create_optimization_plan(&self, database_name: &str, optimization_type: &str) -> Result<Vec<OptimizationRecommendation>> {
        debug!("📋 Creating optimization plan for: {}", database_name);

        let mut plan = Vec::new();

        match optimization_type {
            "index" => {
                plan.push(OptimizationRecommendation {
                    category: OptimizationCategory::IndexOptimization,
                    priority: RecommendationPriority::High,
                    description: "Analyze and create missing indexes".to_string(),
                    impact_score: 8.5,
                    effort_required: EffortLevel::Medium,
                    implementation_steps: vec![
                        "Analyze query patterns".to_string(),
                        "Identify missing indexes".to_string(),
                        "Create optimal indexes".to_string(),
                    ],
                    expected_improvement: "60% faster query performance".to_string(),
                });
            }
            "query" => {
                plan.push(OptimizationRecommendation {
                    category: OptimizationCategory::QueryRewrite,
                    priority: RecommendationPriority::Medium,
                    description: "Optimize slow queries".to_string(),
                    impact_score: 7.2,
                    effort_required: EffortLevel::High,
                    implementation_steps: vec![
                        "Identify slow queries".to_string(),
                        "Analyze execution plans".to_string(),
                        "Rewrite inefficient queries".to_string(),
                    ],
                    expected_improvement: "40% reduction in query time".to_string(),
                });
            }
            "comprehensive" | _ => {
                plan.extend(vec![
                    OptimizationRecommendation {
                        category: OptimizationCategory::IndexOptimization,
                        priority: RecommendationPriority::High,
                        description: "Comprehensive index optimization".to_string(),
                        impact_score: 9.0,
                        effort_required: EffortLevel::Medium,
                        implementation_steps: vec![
                            "Analyze all tables for missing indexes".to_string(),
                            "Remove unused indexes".to_string(),
                            "Create composite indexes for complex queries".to_string(),
                        ],
                        expected_improvement: "50-70% faster queries".to_string(),
                    },
                    OptimizationRecommendation {
                        category: OptimizationCategory::StatisticsUpdate,
                        priority: RecommendationPriority::Medium,
                        description: "Update table statistics for better query planning".to_string(),
                        impact_score: 6.5,
                        effort_required: EffortLevel::Low,
                        implementation_steps: vec![
                            "Run ANALYZE on all tables".to_string(),
                            "Update query planner statistics".to_string(),
                        ],
                        expected_improvement: "15-25% better query plans".to_string(),
                    },
                    OptimizationRecommendation {
                        category: OptimizationCategory::Caching,
                        priority: RecommendationPriority::Medium,
                        description: "Optimize database caching configuration".to_string(),
                        impact_score: 7.8,
                        effort_required: EffortLevel::Medium,
                        implementation_steps: vec![
                            "Analyze cache hit ratios".to_string(),
                            "Increase buffer pool size if needed".to_string(),
                            "Configure query result caching".to_string(),
                        ],
                        expected_improvement: "30% reduction in I/O operations".to_string(),
                    },
                ]);
            }
        }

        info!("📋 Created optimization plan with {} recommendations", plan.len());
        Ok(plan)
    }

    async fn execute_optimization_plan(&self, database_name: &str, plan: &[OptimizationRecommendation]) -> Result<Vec<String>> {
        info!("🔧 Executing optimization plan for: {}", database_name);

        let mut results = Vec::new();

        for (i, recommendation) in plan.iter().enumerate() {
            debug!("🔧 Executing optimization {}/{}: {}", i + 1, plan.len(), recommendation.description);

            // Simulate optimization execution
            let execution_result = self.execute_single_optimization(database_name, recommendation).await?;
            results.push(execution_result);

            // Add delay between optimizations
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }

        info!("✅ Completed {} optimizations for database: {}", results.len(), database_name);
        Ok(results)
    }

    async fn execute_single_optimization(&self, _database_name: &str, recommendation: &OptimizationRecommendation) -> Result<String> {
        match recommendation.category {
            OptimizationCategory::IndexOptimization => {
                debug!("🔍 Executing index optimization");
                // In real implementation: CREATE INDEX statements
                Ok(format!("Created 3 new indexes, removed 1 unused index"))
            }
            OptimizationCategory::StatisticsUpdate => {
                debug!("📊 Updating table statistics");
                // In real implementation: ANALYZE TABLE statements
                Ok(format!("Updated statistics for 12 tables"))
            }
            OptimizationCategory::Caching => {
                debug!("💾 Optimizing cache configuration");
                // In real implementation: Update cache settings
                Ok(format!("Increased buffer pool size by 25%"))
            }
            OptimizationCategory::QueryRewrite => {
                debug!("📝 Optimizing query patterns");
                // In real implementation: Identify and suggest query improvements
                Ok(format!("Identified 5 queries for optimization"))
            }
            _ => {
                Ok(format!("Applied {} optimization", format!("{:?}", recommendation.category)))
            }
        }
    }

    pub async fn analyze_performance(&self) -> Result<serde_json::Value> {
        info!("📊 Analyzing database performance");

        let mut performance_data = serde_json::Map::new();
        let cache = self.optimization_cache.read().await;

        for (database_name, report) in cache.iter() {
            let db_performance = serde_json::json!({
                "database_name": database_name,
                "performance_score": report.overall_performance_score,
                "slow_queries_count": report.slow_queries.len(),
                "optimization_opportunities": report.optimization_opportunities.len(),
                "last_analyzed": report.timestamp
            });

            performance_data.insert(database_name.clone(), db_performance);
        }

        Ok(serde_json::Value::Object(performance_data))
    }

    pub async fn optimize_database_queries(&self, request: &HashMap<String, serde_json::Value>) -> Result<crate::DatabaseOperationResponse> {
        let database_name = request.get("database_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Database name required"))?;

        let optimization_type = request.get("optimization_type")
            .and_then(|v| v.as_str())
            .unwrap_or("comprehensive");

        info!("🔧 Optimizing queries for database: {}", database_name);

        // Create and execute optimization plan
        let plan = self.create_optimization_plan(database_name, optimization_type).await?;
        let results = self.execute_optimization_plan(database_name, &plan).await?;

        let details = serde_json::json!({
            "database_name": database_name,
            "optimization_type": optimization_type,
            "optimizations_applied": results.len(),
            "results": results,
            "performance_improvement": "25-40%",
            "completed_at": chrono::Utc::now()
        });

        Ok(crate::DatabaseOperationResponse {
            operation_id: "".to_string(),
            status: "completed".to_string(),
            message: format!("Query optimization completed for: {}", database_name),
            details: Some(details),
            estimated_duration: Some(240), // 4 minutes
        })
    }
}