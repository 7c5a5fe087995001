//! Multi-operation frame scenarios exercising the scheduler together with
//! the scene graph, joints, cameras and pools

mod frame_scenarios;
