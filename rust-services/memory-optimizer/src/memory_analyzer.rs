//! Memory analysis module for identifying optimization opportunities

use crate::{config::Config, optimization::OptimizationRecommendation};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc, time::{Duration, SystemTime, UNIX_EPOCH}};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryReport {
    pub timestamp: u64,
    pub service: Option<String>,
    pub analysis_duration_minutes: u64,
    pub memory_pressure: f64,
    pub total_memory_mb: u64,
    pub used_memory_mb: u64,
    pub available_memory_mb: u64,
    pub swap_usage_mb: u64,
    pub heap_usage: HeapUsageAnalysis,
    pub gc_analysis: Option<GcAnalysis>,
    pub memory_leaks: Vec<MemoryLeak>,
    pub fragmentation_analysis: FragmentationAnalysis,
    pub recommendations: Vec<OptimizationRecommendation>,
    pub performance_impact: PerformanceImpact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapUsageAnalysis {
    pub allocated_mb: u64,
    pub resident_mb: u64,
    pub mapped_mb: u64,
    pub retained_mb: u64,
    pub fragmentation_ratio: f64,
    pub allocation_rate_mb_per_sec: f64,
    pub deallocation_rate_mb_per_sec: f64,
    pub large_object_heap_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcAnalysis {
    pub total_collections: u64,
    pub total_pause_time_ms: f64,
    pub average_pause_time_ms: f64,
    pub max_pause_time_ms: f64,
    pub collections_per_minute: f64,
    pub gc_overhead_percent: f64,
    pub young_generation_collections: u64,
    pub old_generation_collections: u64,
    pub objects_promoted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLeak {
    pub allocation_site: String,
    pub leaked_bytes: u64,
    pub allocation_count: u64,
    pub confidence: f64,
    pub suggested_fix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentationAnalysis {
    pub external_fragmentation_percent: f64,
    pub internal_fragmentation_percent: f64,
    pub largest_free_block_mb: u64,
    pub free_block_count: u64,
    pub compaction_benefit_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceImpact {
    pub memory_bandwidth_utilization: f64,
    pub cache_miss_rate: f64,
    pub page_fault_rate: f64,
    pub swap_activity_mb_per_sec: f64,
    pub memory_pressure_score: f64,
}

pub struct MemoryAnalyzer {
    config: Arc<Config>,
    analysis_cache: tokio::sync::RwLock<HashMap<String, MemoryReport>>,
}

impl MemoryAnalyzer {
    pub fn new(config: Arc<Config>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(MemoryAnalyzer {
            config,
            analysis_cache: tokio::sync::RwLock::new(HashMap::new()),
        })
    }

    /// Perform comprehensive memory analysis
    pub async fn analyze_memory(
        &self,
        service: Option<&str>,
        duration_minutes: u64,
        include_gc: bool,
    ) -> Result<MemoryReport, Box<dyn std::error::Error + Send + Sync>> {
        info!(
            service = ?service,
            duration_minutes = duration_minutes,
            include_gc = include_gc,
            "Starting memory analysis"
        );

        let start_time = SystemTime::now();
        let timestamp = start_time.duration_since(UNIX_EPOCH)?.as_secs();

        // Gather memory statistics
        let heap_usage = self.analyze_heap_usage(service).await?;
        let gc_analysis = if include_gc {
            Some(self.analyze_garbage_collection(service).await?)
        } else {
            None
        };
        let memory_leaks = self.detect_memory_leaks(service).await?;
        let fragmentation = self.analyze_fragmentation(service).await?;
        let performance_impact = self.analyze_performance_impact(service).await?;

        // Calculate memory pressure
        let memory_pressure = self.calculate_memory_pressure(&heap_usage).await;

        // Generate recommendations
        let recommendations = self.generate_recommendations(
            &heap_usage,
            &gc_analysis,
            &memory_leaks,
            &fragmentation,
            memory_pressure,
        ).await?;

        let report = MemoryReport {
            timestamp,
            service: service.map(|s| s.to_string()),
            analysis_duration_minutes: duration_minutes,
            memory_pressure,
            total_memory_mb: heap_usage.mapped_mb,
            used_memory_mb: heap_usage.allocated_mb,
            available_memory_mb: heap_usage.mapped_mb - heap_usage.allocated_mb,
            swap_usage_mb: 0, // Would be gathered from system info
            heap_usage,
            gc_analysis,
            memory_leaks,
            fragmentation_analysis: fragmentation,
            recommendations,
            performance_impact,
        };

        // Cache the report
        let cache_key = format!("{}_{}", service.unwrap_or("system"), timestamp);
        let mut cache = self.analysis_cache.write().await;
        cache.insert(cache_key, report.clone());

        info!(
            analysis_time_ms = start_time.elapsed()?.as_millis(),
            memory_pressure = memory_pressure,
            recommendations_count = report.recommendations.len(),
            "Memory analysis completed"
        );

        Ok(report)
    }

    /// Analyze heap usage patterns
    async fn analyze_heap_usage(
        &self,
        _service: Option<&str>,
    ) -> Result<HeapUsageAnalysis, Box<dyn std::error::Error + Send + Sync>> {
        // In a real implementation, this would:
        // 1. Query jemalloc stats for allocation information
        // 2. Analyze allocation patterns over time
        // 3. Calculate fragmentation metrics
        // 4. Measure allocation/deallocation rates

        debug!("Analyzing heap usage patterns");

        // Simulated analysis - replace with actual heap profiling
        Ok(HeapUsageAnalysis {
            allocated_mb: 512,
            resident_mb: 768,
            mapped_mb: 1024,
            retained_mb: 256,
            fragmentation_ratio: 0.15,
            allocation_rate_mb_per_sec: 2.5,
            deallocation_rate_mb_per_sec: 2.3,
            large_object_heap_mb: 128,
        })
    }

    /// Analyze garbage collection patterns
    async fn analyze_garbage_collection(
        &self,
        _service: Option<&str>,
    ) -> Result<GcAnalysis, Box<dyn std::error::Error + Send + Sync>> {
        // In a real implementation, this would:
        // 1. Connect to GC-enabled services (Go, Java, etc.)
        // 2. Parse GC logs or query GC metrics
        // 3. Calculate GC efficiency and overhead
        // 4. Identify problematic GC patterns

        debug!("Analyzing garbage collection patterns");

        // Simulated analysis - replace with actual GC metrics
        Ok(GcAnalysis {
            total_collections: 1250,
            total_pause_time_ms: 2500.0,
            average_pause_time_ms: 2.0,
            max_pause_time_ms: 15.0,
            collections_per_minute: 20.8,
            gc_overhead_percent: 1.2,
            young_generation_collections: 1200,
            old_generation_collections: 50,
            objects_promoted: 1024000,
        })
    }

    /// Detect potential memory leaks
    async fn detect_memory_leaks(
        &self,
        _service: Option<&str>,
    ) -> Result<Vec<MemoryLeak>, Box<dyn std::error::Error + Send + Sync>> {
        // In a real implementation, this would:
        // 1. Track allocation sites over time
        // 2. Identify growing allocations that are never freed
        // 3. Analyze object lifetime patterns
        // 4. Use heuristics to detect leak patterns

        debug!("Detecting potential memory leaks");

        // Simulated leak detection
        let leaks = vec![
            MemoryLeak {
                allocation_site: "websocket_connections.rs:145".to_string(),
                leaked_bytes: 2048000, // 2MB
                allocation_count: 500,
                confidence: 0.85,
                suggested_fix: "Ensure WebSocket connections are properly closed and removed from connection pool".to_string(),
            },
            MemoryLeak {
                allocation_site: "cache_manager.rs:89".to_string(),
                leaked_bytes: 1024000, // 1MB
                allocation_count: 200,
                confidence: 0.72,
                suggested_fix: "Implement TTL-based cache eviction to prevent indefinite growth".to_string(),
            },
        ];

        Ok(leaks)
    }

    /// Analyze memory fragmentation
    async fn analyze_fragmentation(
        &self,
        _service: Option<&str>,
    ) -> Result<FragmentationAnalysis, Box<dyn std::error::Error + Send + Sync>> {
        // In a real implementation, this would:
        // 1. Analyze heap structure and free block distribution
        // 2. Calculate internal and external fragmentation
        // 3. Estimate compaction benefits
        // 4. Identify fragmentation hotspots

        debug!("Analyzing memory fragmentation");

        Ok(FragmentationAnalysis {
            external_fragmentation_percent: 12.5,
            internal_fragmentation_percent: 8.3,
            largest_free_block_mb: 64,
            free_block_count: 1250,
            compaction_benefit_mb: 85,
        })
    }

    /// Analyze performance impact of memory usage
    async fn analyze_performance_impact(
        &self,
        _service: Option<&str>,
    ) -> Result<PerformanceImpact, Box<dyn std::error::Error + Send + Sync>> {
        // In a real implementation, this would:
        // 1. Monitor memory bandwidth utilization
        // 2. Track cache miss rates
        // 3. Monitor page fault activity
        // 4. Analyze swap usage patterns

        debug!("Analyzing performance impact");

        Ok(PerformanceImpact {
            memory_bandwidth_utilization: 0.65,
            cache_miss_rate: 0.08,
            page_fault_rate: 0.02,
            swap_activity_mb_per_sec: 0.1,
            memory_pressure_score: 0.73,
        })
    }

    /// Calculate overall memory pressure
    async fn calculate_memory_pressure(&self, heap_usage: &HeapUsageAnalysis) -> f64 {
        // Calculate pressure based on multiple factors
        let allocation_pressure = heap_usage.allocated_mb as f64 / heap_usage.mapped_mb as f64;
        let fragmentation_pressure = heap_usage.fragmentation_ratio;
        let allocation_rate_pressure = heap_usage.allocation_rate_mb_per_sec / 10.0; // Normalize

        // Weighted average of pressure indicators
        let total_pressure = (allocation_pressure * 0.5) + 
                           (fragmentation_pressure * 0.3) + 
                           (allocation_rate_pressure * 0.2);

        total_pressure.min(1.0).max(0.0)
    }

    /// Generate optimization recommendations
    async fn generate_recommendations(
        &self,
        heap_usage: &HeapUsageAnalysis,
        gc_analysis: &Option<GcAnalysis>,
        memory_leaks: &[MemoryLeak],
        fragmentation: &FragmentationAnalysis,
        memory_pressure: f64,
    ) -> Result<Vec<OptimizationRecommendation>, Box<dyn std::error::Error + Send + Sync>> {
        let mut recommendations = Vec::new();

        // High memory pressure recommendations
        if memory_pressure > 0.8 {
            recommendations.push(OptimizationRecommendation {
                priority: "high".to_string(),
                category: "memory_pressure".to_string(),
                title: "High Memory Pressure Detected".to_string(),
                description: "System is under high memory pressure and may benefit from immediate optimization".to_string(),
                action: "trigger_gc".to_string(),
                estimated_benefit_mb: (heap_usage.allocated_mb as f64 * 0.15) as u64,
                implementation_effort: "low".to_string(),
                risk_level: "low".to_string(),
            });
        }

        // Fragmentation recommendations
        if fragmentation.external_fragmentation_percent > 15.0 {
            recommendations.push(OptimizationRecommendation {
                priority: "medium".to_string(),
                category: "fragmentation".to_string(),
                title: "High Memory Fragmentation".to_string(),
                description: "External fragmentation is above threshold, consider compaction".to_string(),
                action: "compact_heap".to_string(),
                estimated_benefit_mb: fragmentation.compaction_benefit_mb,
                implementation_effort: "medium".to_string(),
                risk_level: "medium".to_string(),
            });
        }

        // Memory leak recommendations
        for leak in memory_leaks {
            if leak.confidence > 0.7 {
                recommendations.push(OptimizationRecommendation {
                    priority: "high".to_string(),
                    category: "memory_leak".to_string(),
                    title: format!("Potential Memory Leak at {}", leak.allocation_site),
                    description: leak.suggested_fix.clone(),
                    action: "fix_leak".to_string(),
                    estimated_benefit_mb: leak.leaked_bytes / 1024 / 1024,
                    implementation_effort: "high".to_string(),
                    risk_level: "low".to_string(),
                });
            }
        }

        // GC optimization recommendations
        if let Some(gc) = gc_analysis {
            if gc.gc_overhead_percent > 5.0 {
                recommendations.push(OptimizationRecommendation {
                    priority: "medium".to_string(),
                    category: "garbage_collection".to_string(),
                    title: "High GC Overhead".to_string(),
                    description: "Garbage collection overhead is high, consider tuning GC parameters".to_string(),
                    action: "tune_gc".to_string(),
                    estimated_benefit_mb: 0, // Performance benefit, not memory
                    implementation_effort: "medium".to_string(),
                    risk_level: "medium".to_string(),
                });
            }
        }

        Ok(recommendations)
    }

    /// Get cached analysis report
    pub async fn get_cached_report(&self, service: Option<&str>) -> Option<MemoryReport> {
        let cache = self.analysis_cache.read().await;
        
        // Find the most recent report for the service
        let prefix = service.unwrap_or("system");
        cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .max_by_key(|(_, report)| report.timestamp)
            .map(|(_, report)| report.clone())
    }
}